use crate::detector::ChessboardDetector;
use crate::params::{ChessCornerParams, ChessboardParams, GridGraphParams};
use boardr_core::{Corner, PatternSize};
use chess_corners::{find_chess_corners_image, ChessConfig, CornerDescriptor};
use image::GrayImage;
use log::debug;
use nalgebra::Point2;

/// Grid-corner finding capability used by [`crate::PatternDetector`].
///
/// Implementations return exactly `pattern.count()` corners in row-major
/// order (`pattern.height` rows of `pattern.width`), in the coordinates of
/// `image`, or `None` when the pattern is not fully visible.
pub trait GridFinder {
    fn find_grid(&self, image: &GrayImage, pattern: PatternSize) -> Option<Vec<Point2<f32>>>;
}

impl<F: GridFinder + ?Sized> GridFinder for &F {
    fn find_grid(&self, image: &GrayImage, pattern: PatternSize) -> Option<Vec<Point2<f32>>> {
        (**self).find_grid(image, pattern)
    }
}

/// Default finder: ChESS corners from `chess-corners`, then grid assembly.
pub struct ChessGridFinder {
    chess: ChessCornerParams,
    detector: ChessboardDetector,
}

impl Default for ChessGridFinder {
    fn default() -> Self {
        Self::new(
            ChessCornerParams::default(),
            ChessboardParams::default(),
            GridGraphParams::default(),
        )
    }
}

impl ChessGridFinder {
    pub fn new(chess: ChessCornerParams, board: ChessboardParams, graph: GridGraphParams) -> Self {
        Self {
            chess,
            detector: ChessboardDetector::new(board).with_grid_search(graph),
        }
    }

    fn chess_config(&self) -> ChessConfig {
        let mut cfg = ChessConfig::single_scale();
        cfg.params.threshold_rel = self.chess.threshold_rel;
        cfg.params.nms_radius = self.chess.nms_radius;
        cfg
    }

    /// Detect raw ChESS corners and adapt them into `boardr-core::Corner`.
    pub fn detect_corners(&self, image: &GrayImage) -> Vec<Corner> {
        let cfg = self.chess_config();
        find_chess_corners_image(image, &cfg)
            .iter()
            .map(adapt_chess_corner)
            .collect()
    }
}

impl GridFinder for ChessGridFinder {
    fn find_grid(&self, image: &GrayImage, pattern: PatternSize) -> Option<Vec<Point2<f32>>> {
        let corners = self.detect_corners(image);
        debug!("found {} raw ChESS corners", corners.len());
        let detection = self.detector.detect_from_corners(&corners, pattern)?;
        Some(detection.corners.iter().map(|c| c.position).collect())
    }
}

fn adapt_chess_corner(c: &CornerDescriptor) -> Corner {
    Corner {
        position: Point2::new(c.x, c.y),
        strength: c.response,
    }
}
