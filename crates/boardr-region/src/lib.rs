//! Board region extraction from a still frame.
//!
//! Pipeline: grayscale frame -> [`EdgeMapBuilder`] (3x3 mean blur + adaptive
//! mean threshold, or Canny edges) -> [`ContourAnalyzer`] (contour hierarchy,
//! pluggable [`BoundarySelector`], Douglas-Peucker simplification) ->
//! [`extract_board`] (polygon mask applied to the original frame).
//!
//! Nothing here displays windows or waits on a user. Diagnostics go through a
//! [`DebugSink`], and the interactive threshold path is the pure [`reprocess`]
//! function.

mod contour;
mod debug;
mod edge_map;
mod error;
mod extract;
mod overlay;
mod polygon;
mod threshold;

pub use contour::{
    reprocess, reprocess_board, AreaPerimeterRatio, BoardContour, BoundarySelector, ContourAnalyzer, ContourStats,
    LargestArea,
};
pub use debug::{DebugSink, NullDebugSink};
pub use edge_map::{EdgeMapBuilder, EdgeMapParams};
pub use error::RegionError;
pub use extract::{build_mask, extract_board, extract_frame};
pub use overlay::{draw_components, draw_contours};
pub use polygon::{BoundaryPolygon, BoundingBox};
pub use threshold::adaptive_mean_threshold;

pub use imageproc::point::Point;
