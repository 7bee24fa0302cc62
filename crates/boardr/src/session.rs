//! One calibration capture session: collect views, then isolate the board.

use crate::config::BoardrConfig;
use crate::debug::{draw_calibration, FileDebugSink};
use crate::error::{BoardrError, BoardrIoError};
use crate::source::{FrameSource, SourceError};
use boardr_chessboard::{ChessGridFinder, GridFinder, PatternDetector};
use boardr_core::{CorrespondenceAccumulator, CorrespondenceSet, PatternSize};
use boardr_region::{
    draw_components, draw_contours, extract_frame, reprocess_board, BoundaryPolygon, BoundingBox,
    ContourAnalyzer, DebugSink, EdgeMapBuilder, NullDebugSink, RegionError,
};
use image::{DynamicImage, GrayImage};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Seed for diagnostic contour colours, fixed so overlays are reproducible.
const COLOR_SEED: u64 = 12345;

/// Why a capture loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    /// The accumulator reached its target.
    Complete,
    /// The frame source ran dry (or yielded an empty frame).
    EndOfStream,
    /// `max_frames` frames were consumed.
    FrameBudgetExhausted,
}

/// Outcome of pulling one frame from a source.
enum Pulled {
    Frame(DynamicImage),
    Unreadable,
    End,
}

/// Result of running the extraction stage on the calibration frame.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub polygon: BoundaryPolygon,
    /// Bounding box of the largest-area contour (diagnostic).
    pub bounding_box: BoundingBox,
    /// Calibration frame with everything outside `polygon` zeroed.
    pub masked: DynamicImage,
}

/// Serializable summary written at the end of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub pattern: PatternSize,
    pub target_count: usize,
    pub frames_seen: usize,
    pub complete: bool,
    pub sets: Vec<CorrespondenceSet>,
    pub calibration_image: Option<PathBuf>,
    pub boundary: Option<BoundaryPolygon>,
    pub bounding_box: Option<BoundingBox>,
}

impl SessionReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BoardrIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BoardrIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Session-scoped state: accumulated views, the last calibration frame, the
/// Canny threshold used for re-extraction and the overlay colour stream.
pub struct CalibrationSession<F = ChessGridFinder> {
    config: BoardrConfig,
    detector: PatternDetector<F>,
    accumulator: CorrespondenceAccumulator,
    edge_map: EdgeMapBuilder,
    analyzer: ContourAnalyzer,
    sink: Box<dyn DebugSink>,
    rng: StdRng,
    threshold: f32,
    frames_seen: usize,
    calibration_frame: Option<DynamicImage>,
    extraction: Option<Extraction>,
}

impl CalibrationSession<ChessGridFinder> {
    /// Session with the default ChESS grid finder configured from `config`.
    pub fn new(config: BoardrConfig) -> Result<Self, BoardrError> {
        let finder = ChessGridFinder::new(
            config.chess.clone(),
            config.chessboard.clone(),
            config.grid.clone(),
        );
        Self::with_finder(config, finder)
    }
}

impl<F: GridFinder> CalibrationSession<F> {
    pub fn with_finder(config: BoardrConfig, finder: F) -> Result<Self, BoardrError> {
        config.validate()?;
        let detector = PatternDetector::new(finder, config.image_scale_factor)?;
        let accumulator = CorrespondenceAccumulator::new(config.pattern(), config.target_count)?;
        let edge_map = EdgeMapBuilder::new(config.edge_map.clone())?;
        let sink: Box<dyn DebugSink> = if config.debug {
            Box::new(FileDebugSink::new(config.debug_dir.clone()))
        } else {
            Box::new(NullDebugSink)
        };
        Ok(Self {
            threshold: config.canny_threshold,
            config,
            detector,
            accumulator,
            edge_map,
            analyzer: ContourAnalyzer::default(),
            sink,
            rng: StdRng::seed_from_u64(COLOR_SEED),
            frames_seen: 0,
            calibration_frame: None,
            extraction: None,
        })
    }

    /// Route diagnostics to `sink` (only used when `debug` is enabled).
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &BoardrConfig {
        &self.config
    }

    pub fn accumulator(&self) -> &CorrespondenceAccumulator {
        &self.accumulator
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn calibration_frame(&self) -> Option<&DynamicImage> {
        self.calibration_frame.as_ref()
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }

    fn sink(&self) -> Option<&dyn DebugSink> {
        self.config.debug.then_some(self.sink.as_ref())
    }

    fn budget_left(&self) -> bool {
        self.config.max_frames.map_or(true, |max| self.frames_seen < max)
    }

    /// Pull one frame. Zero-sized frames count as end-of-stream; frames the
    /// source cannot decode count against the budget and are skipped.
    fn pull(&mut self, source: &mut dyn FrameSource) -> Result<Pulled, BoardrError> {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(Pulled::End),
            Err(SourceError::Frame { path, source: err }) => {
                self.frames_seen += 1;
                warn!("skipping unreadable frame {}: {err}", path.display());
                return Ok(Pulled::Unreadable);
            }
            Err(e) => return Err(e.into()),
        };
        if frame.width() == 0 || frame.height() == 0 {
            debug!("empty frame, treating as end of stream");
            return Ok(Pulled::End);
        }
        self.frames_seen += 1;
        Ok(Pulled::Frame(frame))
    }

    /// Store `frame` as the calibration frame and write it to `image_path`.
    fn keep_frame(
        &mut self,
        frame: DynamicImage,
        gray: &GrayImage,
        corners: &[nalgebra::Point2<f32>],
    ) -> Result<(), BoardrError> {
        frame.save(&self.config.image_path).map_err(BoardrIoError::from)?;
        debug!("saved calibration frame to {}", self.config.image_path.display());
        if let Some(sink) = self.sink() {
            let overlay = draw_calibration(gray, corners, self.accumulator.pattern());
            sink.emit("calibration", &DynamicImage::ImageRgb8(overlay));
        }
        self.calibration_frame = Some(frame);
        self.extraction = None;
        Ok(())
    }

    /// Pull frames until the accumulator is complete, the source ends or
    /// the frame budget runs out. Misses are logged and retried.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn capture(&mut self, source: &mut dyn FrameSource) -> Result<CaptureStatus, BoardrError> {
        if self.config.max_frames.is_none() {
            warn!("no max_frames set; capture retries until the source ends");
        }
        let pattern = self.accumulator.pattern();
        while !self.accumulator.is_complete() {
            if !self.budget_left() {
                warn!("frame budget exhausted after {} frames", self.frames_seen);
                return Ok(CaptureStatus::FrameBudgetExhausted);
            }
            let frame = match self.pull(source)? {
                Pulled::Frame(frame) => frame,
                Pulled::Unreadable => continue,
                Pulled::End => {
                    info!("frame source ended after {} frames", self.frames_seen);
                    return Ok(CaptureStatus::EndOfStream);
                }
            };
            let gray = frame.to_luma8();
            let detection = self.detector.detect(&gray, pattern);
            if !detection.found {
                info!("searching for chessboard... (frame {})", self.frames_seen);
                continue;
            }
            self.keep_frame(frame, &gray, &detection.corners)?;
            self.accumulator.accept(detection.corners)?;
        }
        Ok(CaptureStatus::Complete)
    }

    /// Pull frames until the pattern is seen once more and keep that frame as
    /// the calibration frame, without adding a view.
    fn reacquire(&mut self, source: &mut dyn FrameSource) -> Result<bool, BoardrError> {
        let pattern = self.accumulator.pattern();
        while self.budget_left() {
            let frame = match self.pull(source)? {
                Pulled::Frame(frame) => frame,
                Pulled::Unreadable => continue,
                Pulled::End => return Ok(false),
            };
            let gray = frame.to_luma8();
            let detection = self.detector.detect(&gray, pattern);
            if detection.found {
                self.keep_frame(frame, &gray, &detection.corners)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run the region stage on the calibration frame.
    ///
    /// `BoundaryNotFound` is returned as-is; the caller should reacquire.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn extract(&mut self) -> Result<&Extraction, BoardrError> {
        let frame = self
            .calibration_frame
            .as_ref()
            .ok_or(BoardrError::NoCalibrationFrame)?;
        let gray = frame.to_luma8();
        let map = self.edge_map.build(&gray, self.sink());
        let board = self.analyzer.find_board_contour(&map)?;
        if let Some(sink) = self.sink() {
            let overlay = draw_components(&frame.to_rgb8(), &board);
            sink.emit("components", &DynamicImage::ImageRgb8(overlay));
        }
        let masked = extract_frame(frame, &board.polygon);
        if let Some(sink) = self.sink() {
            sink.emit("masked_board", &masked);
        }
        info!(
            "board boundary: {} vertices, bbox {}x{} at ({}, {})",
            board.polygon.len(),
            board.bounding_box.width,
            board.bounding_box.height,
            board.bounding_box.x,
            board.bounding_box.y
        );
        Ok(self.extraction.insert(Extraction {
            polygon: board.polygon,
            bounding_box: board.bounding_box,
            masked,
        }))
    }

    /// Full session: capture, then extract, reacquiring a new calibration
    /// frame whenever no boundary is found.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> Result<CaptureStatus, BoardrError> {
        let status = self.capture(source)?;
        if status != CaptureStatus::Complete {
            return Ok(status);
        }
        loop {
            match self.extract() {
                Ok(_) => return Ok(CaptureStatus::Complete),
                Err(BoardrError::Region(RegionError::BoundaryNotFound)) => {
                    warn!("no board boundary in calibration frame; reacquiring");
                    self.calibration_frame = None;
                    if !self.reacquire(source)? {
                        return Ok(if self.budget_left() {
                            CaptureStatus::EndOfStream
                        } else {
                            CaptureStatus::FrameBudgetExhausted
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Re-extract the boundary from Canny edges at `threshold` and remember
    /// the threshold once extraction succeeds. With debug on, the contours
    /// are emitted as `contours`.
    pub fn reprocess(&mut self, threshold: f32) -> Result<BoundaryPolygon, BoardrError> {
        let frame = self
            .calibration_frame
            .as_ref()
            .ok_or(BoardrError::NoCalibrationFrame)?;
        let board = reprocess_board(&frame.to_luma8(), threshold, &self.analyzer)?;
        self.threshold = threshold;
        if self.config.debug {
            let (w, h) = (frame.width(), frame.height());
            let overlay = draw_contours(w, h, &board.contours, &mut self.rng);
            self.sink.emit("contours", &DynamicImage::ImageRgb8(overlay));
        }
        debug!(
            "reprocessed at threshold {threshold}: {} vertices",
            board.polygon.len()
        );
        Ok(board.polygon)
    }

    /// Consume the session into its report, writing it to `report_path` when
    /// one is configured.
    pub fn finish(self) -> Result<SessionReport, BoardrError> {
        let complete = self.accumulator.is_complete();
        let report = SessionReport {
            pattern: self.accumulator.pattern(),
            target_count: self.accumulator.target_count(),
            frames_seen: self.frames_seen,
            complete,
            calibration_image: self
                .calibration_frame
                .as_ref()
                .map(|_| self.config.image_path.clone()),
            boundary: self.extraction.as_ref().map(|e| e.polygon.clone()),
            bounding_box: self.extraction.as_ref().map(|e| e.bounding_box),
            sets: self.accumulator.into_sets(),
        };
        if let Some(path) = &self.config.report_path {
            report.write_json(path)?;
            info!("report written to {}", path.display());
        }
        Ok(report)
    }
}
