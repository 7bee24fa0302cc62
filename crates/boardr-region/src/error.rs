/// Errors produced by the region extraction stages.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RegionError {
    /// No contour with a positive perimeter; discard the frame and reacquire.
    #[error("board boundary not found (no contour with positive perimeter)")]
    BoundaryNotFound,
    #[error("adaptive threshold block size must be odd and >= 3, got {0}")]
    InvalidBlockSize(u32),
    #[error("adaptive threshold offset must be finite, got {0}")]
    InvalidOffset(f64),
    #[error("canny threshold must be in [0, 255], got {0}")]
    InvalidCannyThreshold(f32),
    #[error("simplification tolerance must be in (0, 1], got {0}")]
    InvalidEpsilon(f64),
}
