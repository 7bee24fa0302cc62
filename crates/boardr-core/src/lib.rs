//! Core types and correspondence bookkeeping for chessboard calibration capture.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete corner detector or image type: detectors adapt
//! their output into [`Corner`] / `Point2<f32>` and hand accepted views to a
//! [`CorrespondenceAccumulator`].

mod corner;
mod correspondence;
mod logger;

pub use corner::{Corner, PatternSize};
pub use correspondence::{
    object_points, CorrespondenceAccumulator, CorrespondenceError, CorrespondenceSet,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
