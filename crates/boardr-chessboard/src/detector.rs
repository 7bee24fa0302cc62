use crate::gridgraph::{
    assign_grid_coordinates, connected_components, estimate_grid_axes, GridGraph,
};
use crate::params::{ChessboardParams, GridGraphParams};
use boardr_core::{Corner, PatternSize};
use log::debug;
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Ordered chessboard corners for one pattern instance.
#[derive(Clone, Debug)]
pub struct ChessboardDetection {
    /// `pattern.height` rows of `pattern.width` corners, row-major.
    pub corners: Vec<Corner>,
    /// `true` when pattern rows run along image +x instead of +y.
    pub transposed: bool,
    /// Estimated corner spacing in pixels.
    pub spacing: f32,
}

/// Grid component matching the pattern cell for cell.
struct Window {
    i0: i32,
    j0: i32,
    transposed: bool,
    strength: f32,
}

/// Chessboard detector working on a cloud of corner candidates.
pub struct ChessboardDetector {
    pub params: ChessboardParams,
    pub graph: GridGraphParams,
}

impl ChessboardDetector {
    pub fn new(params: ChessboardParams) -> Self {
        Self {
            params,
            graph: GridGraphParams::default(),
        }
    }

    pub fn with_grid_search(mut self, graph: GridGraphParams) -> Self {
        self.graph = graph;
        self
    }

    /// Find one complete `pattern` in a cloud of corners.
    ///
    /// Returns `None` unless every one of the `pattern.count()` inner corners
    /// is present and connected. A connected grid with extra rows or columns
    /// is a different board and is rejected; unconnected strays are ignored.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, corners), fields(num_corners = corners.len()))
    )]
    pub fn detect_from_corners(
        &self,
        corners: &[Corner],
        pattern: PatternSize,
    ) -> Option<ChessboardDetection> {
        let max_strength = corners.iter().map(|c| c.strength).fold(0.0f32, f32::max);
        let floor = self.params.min_strength_rel * max_strength;
        let strong: Vec<Corner> = corners
            .iter()
            .copied()
            .filter(|c| c.strength >= floor)
            .collect();

        debug!(
            "{} of {} corners above strength floor {:.3}",
            strong.len(),
            corners.len(),
            floor
        );
        if strong.len() < pattern.count() {
            return None;
        }

        let Some(axes) = estimate_grid_axes(&strong, &self.graph) else {
            debug!("failed to estimate grid axes");
            return None;
        };
        let graph = GridGraph::new(&strong, &axes, &self.graph);

        let mut best: Option<(Vec<usize>, Window)> = None;
        for component in connected_components(&graph) {
            if component.len() < pattern.count() {
                continue;
            }
            let coords = assign_grid_coordinates(&graph, &component);
            let mut by_coord: HashMap<(i32, i32), usize> = HashMap::with_capacity(coords.len());
            for (node, i, j) in coords {
                by_coord.entry((i, j)).or_insert(node);
            }

            let Some(window) = exact_window(&by_coord, &strong, pattern) else {
                continue;
            };
            let better = best
                .as_ref()
                .map_or(true, |(_, current)| window.strength > current.strength);
            if better {
                let indices = window_indices(&by_coord, &window, pattern);
                best = Some((indices, window));
            }
        }

        let (indices, window) = best?;
        debug!(
            "assembled {} grid (transposed={}, spacing={:.1}px)",
            pattern, window.transposed, axes.spacing
        );
        Some(ChessboardDetection {
            corners: indices.into_iter().map(|k| strong[k]).collect(),
            transposed: window.transposed,
            spacing: axes.spacing,
        })
    }
}

/// The component as a `pattern` window, if its extent is exactly
/// `width x height` (or transposed) and every cell is populated.
fn exact_window(
    by_coord: &HashMap<(i32, i32), usize>,
    corners: &[Corner],
    pattern: PatternSize,
) -> Option<Window> {
    let (mut min_i, mut min_j) = (i32::MAX, i32::MAX);
    let (mut max_i, mut max_j) = (i32::MIN, i32::MIN);
    for &(i, j) in by_coord.keys() {
        min_i = min_i.min(i);
        min_j = min_j.min(j);
        max_i = max_i.max(i);
        max_j = max_j.max(j);
    }
    let extent = ((max_i - min_i + 1) as u32, (max_j - min_j + 1) as u32);

    let transposed = if extent == (pattern.width, pattern.height) {
        false
    } else if extent == (pattern.height, pattern.width) {
        true
    } else {
        debug!(
            "component spans {}x{}, expected {}",
            extent.0, extent.1, pattern
        );
        return None;
    };

    let mut strength = 0.0f32;
    for i in min_i..=max_i {
        for j in min_j..=max_j {
            strength += corners[*by_coord.get(&(i, j))?].strength;
        }
    }
    Some(Window {
        i0: min_i,
        j0: min_j,
        transposed,
        strength,
    })
}

fn window_indices(
    by_coord: &HashMap<(i32, i32), usize>,
    window: &Window,
    pattern: PatternSize,
) -> Vec<usize> {
    let mut out = Vec::with_capacity(pattern.count());
    for r in 0..pattern.height as i32 {
        for c in 0..pattern.width as i32 {
            let key = if window.transposed {
                (window.i0 + r, window.j0 + c)
            } else {
                (window.i0 + c, window.j0 + r)
            };
            if let Some(&k) = by_coord.get(&key) {
                out.push(k);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cols: usize, rows: usize, spacing: f32, origin: (f32, f32)) -> Vec<Corner> {
        let mut corners = Vec::new();
        for j in 0..rows {
            for i in 0..cols {
                corners.push(Corner::new(
                    origin.0 + i as f32 * spacing,
                    origin.1 + j as f32 * spacing,
                    1.0,
                ));
            }
        }
        corners
    }

    #[test]
    fn orders_corners_row_major() {
        let mut corners = grid(4, 3, 20.0, (50.0, 40.0));
        corners.reverse();
        let detector = ChessboardDetector::new(ChessboardParams::default());
        let det = detector
            .detect_from_corners(&corners, PatternSize::new(4, 3))
            .unwrap();

        assert!(!det.transposed);
        assert_eq!(12, det.corners.len());
        for (k, c) in det.corners.iter().enumerate() {
            let expected_x = 50.0 + (k % 4) as f32 * 20.0;
            let expected_y = 40.0 + (k / 4) as f32 * 20.0;
            approx::assert_abs_diff_eq!(expected_x, c.position.x, epsilon = 1e-4);
            approx::assert_abs_diff_eq!(expected_y, c.position.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn accepts_transposed_board() {
        // 3 corners along x, 4 along y, requested as width 4 / height 3.
        let corners = grid(3, 4, 20.0, (0.0, 0.0));
        let detector = ChessboardDetector::new(ChessboardParams::default());
        let det = detector
            .detect_from_corners(&corners, PatternSize::new(4, 3))
            .unwrap();
        assert!(det.transposed);
        assert_eq!(12, det.corners.len());
        // First row runs along +y.
        approx::assert_abs_diff_eq!(0.0, det.corners[1].position.x, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(20.0, det.corners[1].position.y, epsilon = 1e-4);
    }

    #[test]
    fn rejects_incomplete_board() {
        let mut corners = grid(4, 3, 20.0, (0.0, 0.0));
        corners.remove(5);
        let detector = ChessboardDetector::new(ChessboardParams::default());
        assert!(detector
            .detect_from_corners(&corners, PatternSize::new(4, 3))
            .is_none());
    }

    #[test]
    fn rejects_larger_grid() {
        let corners = grid(6, 5, 15.0, (10.0, 10.0));
        let detector = ChessboardDetector::new(ChessboardParams::default());
        assert!(detector
            .detect_from_corners(&corners, PatternSize::new(5, 4))
            .is_none());
        assert!(detector
            .detect_from_corners(&corners, PatternSize::new(6, 4))
            .is_none());
    }

    #[test]
    fn exact_grid_survives_stray_corners() {
        let mut corners = grid(5, 4, 15.0, (10.0, 10.0));
        corners.push(Corner::new(400.0, 400.0, 1.0));
        corners.push(Corner::new(17.0, 300.0, 1.0));
        let detector = ChessboardDetector::new(ChessboardParams::default());
        let det = detector
            .detect_from_corners(&corners, PatternSize::new(5, 4))
            .unwrap();
        assert_eq!(20, det.corners.len());
        approx::assert_abs_diff_eq!(10.0, det.corners[0].position.x, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(55.0, det.corners[19].position.y, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(15.0, det.spacing, epsilon = 1e-3);
    }

    #[test]
    fn weak_corners_are_ignored() {
        let mut corners = grid(3, 3, 20.0, (0.0, 0.0));
        for c in corners.iter_mut().take(2) {
            c.strength = 0.01;
        }
        let detector = ChessboardDetector::new(ChessboardParams::default());
        assert!(detector
            .detect_from_corners(&corners, PatternSize::new(3, 3))
            .is_none());
    }
}
