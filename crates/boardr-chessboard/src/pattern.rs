use crate::finder::{ChessGridFinder, GridFinder};
use boardr_core::PatternSize;
use image::imageops::{self, FilterType};
use image::GrayImage;
use log::debug;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PatternParamsError {
    #[error("image scale factor must be in (0, 1], got {0}")]
    InvalidScaleFactor(f32),
}

/// Outcome of looking for the pattern in one frame.
///
/// `found == false` is a normal per-frame miss; `corners` is then empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternDetection {
    pub found: bool,
    /// Corners in original-frame coordinates, row-major.
    pub corners: Vec<Point2<f32>>,
}

impl PatternDetection {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Downsampling wrapper around a [`GridFinder`].
pub struct PatternDetector<F = ChessGridFinder> {
    finder: F,
    scale_factor: f32,
}

impl<F: GridFinder> PatternDetector<F> {
    /// Create a detector that runs `finder` on frames scaled by `scale_factor`.
    pub fn new(finder: F, scale_factor: f32) -> Result<Self, PatternParamsError> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 || scale_factor > 1.0 {
            return Err(PatternParamsError::InvalidScaleFactor(scale_factor));
        }
        Ok(Self {
            finder,
            scale_factor,
        })
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Look for a complete `pattern` in `frame`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, frame, pattern),
            fields(width = frame.width(), height = frame.height(), pattern = %pattern)
        )
    )]
    pub fn detect(&self, frame: &GrayImage, pattern: PatternSize) -> PatternDetection {
        if frame.width() == 0 || frame.height() == 0 {
            return PatternDetection::not_found();
        }

        let scaled;
        let view = if self.scale_factor < 1.0 {
            let w = ((frame.width() as f32 * self.scale_factor).round() as u32).max(1);
            let h = ((frame.height() as f32 * self.scale_factor).round() as u32).max(1);
            scaled = imageops::resize(frame, w, h, FilterType::Triangle);
            &scaled
        } else {
            frame
        };

        let Some(corners) = self.finder.find_grid(view, pattern) else {
            return PatternDetection::not_found();
        };
        if corners.len() != pattern.count() {
            debug!(
                "finder returned {} corners, pattern {} needs {}",
                corners.len(),
                pattern,
                pattern.count()
            );
            return PatternDetection::not_found();
        }

        let inv = 1.0 / self.scale_factor;
        PatternDetection {
            found: true,
            corners: corners
                .into_iter()
                .map(|p| Point2::new(p.x * inv, p.y * inv))
                .collect(),
        }
    }
}
