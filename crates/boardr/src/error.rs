use crate::config::ConfigError;
use crate::source::SourceError;
use boardr_chessboard::PatternParamsError;
use boardr_core::CorrespondenceError;
use boardr_region::RegionError;

/// File I/O failures for configs, reports and saved frames.
#[derive(thiserror::Error, Debug)]
pub enum BoardrIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Top-level error for a capture session.
#[derive(thiserror::Error, Debug)]
pub enum BoardrError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pattern(#[from] PatternParamsError),
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Io(#[from] BoardrIoError),
    #[error("no calibration frame captured yet")]
    NoCalibrationFrame,
}
