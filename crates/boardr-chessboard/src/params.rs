use serde::{Deserialize, Serialize};

/// Settings forwarded to the `chess-corners` ChESS detector.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChessCornerParams {
    /// Response threshold relative to the strongest response in the image.
    pub threshold_rel: f32,
    /// Non-maximum suppression radius in pixels.
    pub nms_radius: u32,
}

impl Default for ChessCornerParams {
    fn default() -> Self {
        Self {
            threshold_rel: 0.2,
            nms_radius: 2,
        }
    }
}

/// Neighbour search settings for the grid graph.
///
/// Spacing bounds are relative to the estimated base spacing (median
/// nearest-neighbour distance), so they hold across image scales.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridGraphParams {
    pub min_spacing_rel: f32,
    pub max_spacing_rel: f32,
    pub k_neighbors: usize,
    pub orientation_tolerance_deg: f32,
}

impl Default for GridGraphParams {
    fn default() -> Self {
        Self {
            min_spacing_rel: 0.6,
            max_spacing_rel: 1.4,
            k_neighbors: 8,
            orientation_tolerance_deg: 20.0,
        }
    }
}

/// Parameters specific to the chessboard detector.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChessboardParams {
    /// Drop corners weaker than this fraction of the strongest corner.
    pub min_strength_rel: f32,
}

impl Default for ChessboardParams {
    fn default() -> Self {
        Self {
            min_strength_rel: 0.05,
        }
    }
}
