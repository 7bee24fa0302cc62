//! Chessboard calibration capture.
//!
//! A [`CalibrationSession`] pulls frames from a [`FrameSource`], looks for a
//! `width x height` inner-corner chessboard in each one and accumulates
//! image/object point correspondences until `target_count` views are
//! collected. The last successful frame is saved and then run through the
//! region stage (adaptive threshold, contour selection, polygon mask) to
//! isolate the board.
//!
//! ## Quickstart
//!
//! ```no_run
//! use boardr::{BoardrConfig, CalibrationSession, ImageDirSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoardrConfig {
//!     board_width: 7,
//!     board_height: 7,
//!     max_frames: Some(200),
//!     ..BoardrConfig::default()
//! };
//! let mut source = ImageDirSource::open("frames")?;
//! let mut session = CalibrationSession::new(config)?;
//! session.run(&mut source)?;
//! let report = session.finish()?;
//! println!("collected {} views", report.sets.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `boardr::core`: corners, pattern size, correspondence bookkeeping, logger.
//! - `boardr::chessboard`: ChESS-based pattern detection.
//! - `boardr::region`: edge maps, boundary selection, masking.

pub use boardr_chessboard as chessboard;
pub use boardr_core as core;
pub use boardr_region as region;

mod config;
mod debug;
mod error;
mod session;
mod source;

pub use boardr_chessboard::{PatternDetection, PatternDetector};
pub use boardr_core::{CorrespondenceAccumulator, CorrespondenceSet, PatternSize};
pub use boardr_region::{reprocess, BoundaryPolygon, BoundingBox, DebugSink, NullDebugSink};

pub use config::{BoardrConfig, ConfigError};
pub use debug::{draw_calibration, FileDebugSink};
pub use error::{BoardrError, BoardrIoError};
pub use session::{CalibrationSession, CaptureStatus, Extraction, SessionReport};
pub use source::{FrameSource, ImageDirSource, SourceError, VecFrameSource};
