//! Chessboard pattern detector built on top of `boardr-core`.
//!
//! ## Quickstart
//!
//! ```no_run
//! use boardr_chessboard::{ChessGridFinder, PatternDetector};
//! use boardr_core::PatternSize;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = image::open("frame.png")?.to_luma8();
//! let detector = PatternDetector::new(ChessGridFinder::default(), 0.5)?;
//! let result = detector.detect(&frame, PatternSize::new(9, 6));
//! println!("found: {} ({} corners)", result.found, result.corners.len());
//! # Ok(())
//! # }
//! ```
//!
//! Grid assembly (position-only, no reliance on detector orientations):
//! 1. Run ChESS on the downsampled frame and drop weak responses.
//! 2. Estimate a base spacing from nearest-neighbour distances.
//! 3. Estimate the two grid axes from neighbour edge directions.
//! 4. For each corner keep at most one neighbour per direction
//!    (right/left/up/down), then keep only mutual links.
//! 5. BFS each connected component and assign integer coordinates (i, j).
//! 6. Pick a fully populated `width x height` window and emit its corners
//!    row-major.

mod detector;
mod finder;
mod geom;
mod gridgraph;
mod params;
mod pattern;

pub use detector::{ChessboardDetection, ChessboardDetector};
pub use finder::{ChessGridFinder, GridFinder};
pub use gridgraph::{
    assign_grid_coordinates, connected_components, estimate_grid_axes, GridAxes, GridGraph,
    NeighborDirection, NodeNeighbor,
};
pub use params::{ChessCornerParams, ChessboardParams, GridGraphParams};
pub use pattern::{PatternDetection, PatternDetector, PatternParamsError};
