use crate::geom::{angle_to_unit, dominant_axis_angle};
use crate::params::GridGraphParams;
use boardr_core::Corner;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector2;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeighborDirection {
    Right,
    Left,
    Up,
    Down,
}

impl NeighborDirection {
    pub fn opposite(self) -> Self {
        match self {
            NeighborDirection::Right => NeighborDirection::Left,
            NeighborDirection::Left => NeighborDirection::Right,
            NeighborDirection::Up => NeighborDirection::Down,
            NeighborDirection::Down => NeighborDirection::Up,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// Grid step `(di, dj)` taken when following this link.
    pub fn step(self) -> (i32, i32) {
        match self {
            NeighborDirection::Right => (1, 0),
            NeighborDirection::Left => (-1, 0),
            NeighborDirection::Up => (0, -1),
            NeighborDirection::Down => (0, 1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeNeighbor {
    pub direction: NeighborDirection,
    pub index: usize,
    pub distance: f32,
    pub score: f32,
}

/// Local grid frame shared by every corner of an undistorted board.
///
/// `u` is the grid axis closest to image +x and `v` is `u` rotated by +90°,
/// so it points roughly along image +y.
#[derive(Clone, Copy, Debug)]
pub struct GridAxes {
    pub u: Vector2<f32>,
    pub v: Vector2<f32>,
    /// Base spacing in pixels (median nearest-neighbour distance).
    pub spacing: f32,
}

fn build_tree(corners: &[Corner]) -> KdTree<f32, 2> {
    let coords = corners
        .iter()
        .map(|c| [c.position.x, c.position.y])
        .collect::<Vec<_>>();
    (&coords).into()
}

/// Estimate the base spacing and the two grid axes from corner positions.
///
/// Returns `None` for fewer than two corners or when neighbour directions
/// carry no dominant axis pair.
pub fn estimate_grid_axes(corners: &[Corner], params: &GridGraphParams) -> Option<GridAxes> {
    if corners.len() < 2 {
        return None;
    }
    let tree = build_tree(corners);

    let mut nn_dists: Vec<f32> = corners
        .iter()
        .filter_map(|c| {
            let q = [c.position.x, c.position.y];
            tree.nearest_n::<SquaredEuclidean>(&q, 2)
                .into_iter()
                .map(|nn| nn.distance.sqrt())
                .find(|d| *d > f32::EPSILON)
        })
        .collect();
    if nn_dists.is_empty() {
        return None;
    }
    nn_dists.sort_by(|a, b| a.total_cmp(b));
    let spacing = nn_dists[nn_dists.len() / 2];

    let lo = params.min_spacing_rel * spacing;
    let hi = params.max_spacing_rel * spacing;
    let mut edges = Vec::new();
    for (i, c) in corners.iter().enumerate() {
        let q = [c.position.x, c.position.y];
        for nn in tree.nearest_n::<SquaredEuclidean>(&q, 5) {
            let j = nn.item as usize;
            if j == i {
                continue;
            }
            let e = corners[j].position - c.position;
            let d = e.norm();
            if d >= lo && d <= hi {
                edges.push(e);
            }
        }
    }

    let theta = dominant_axis_angle(edges)?;
    let u = angle_to_unit(theta);
    let v = Vector2::new(-u.y, u.x);
    Some(GridAxes { u, v, spacing })
}

fn classify_neighbor(
    corner: &Corner,
    neighbor: &Corner,
    neighbor_index: usize,
    axes: &GridAxes,
    params: &GridGraphParams,
) -> Option<NodeNeighbor> {
    // 1. Distance close to the base spacing.
    let offset = neighbor.position - corner.position;
    let distance = offset.norm();
    if distance < params.min_spacing_rel * axes.spacing
        || distance > params.max_spacing_rel * axes.spacing
    {
        return None;
    }

    // 2. Direction collinear with one of the grid axes.
    let e = offset / distance;
    let pu = e.dot(&axes.u);
    let pv = e.dot(&axes.v);
    let alignment = pu.abs().max(pv.abs());
    if alignment < params.orientation_tolerance_deg.to_radians().cos() {
        return None;
    }

    let direction = if pu.abs() >= pv.abs() {
        if pu >= 0.0 {
            NeighborDirection::Right
        } else {
            NeighborDirection::Left
        }
    } else if pv >= 0.0 {
        NeighborDirection::Down
    } else {
        NeighborDirection::Up
    };

    let score = (1.0 - alignment) + (distance - axes.spacing).abs() / axes.spacing;
    Some(NodeNeighbor {
        direction,
        index: neighbor_index,
        distance,
        score,
    })
}

/// Lowest score per direction; equal scores prefer the closer candidate.
fn select_neighbors(candidates: Vec<NodeNeighbor>) -> Vec<NodeNeighbor> {
    let mut slots: [Option<NodeNeighbor>; 4] = Default::default();
    for cand in candidates {
        let slot = &mut slots[cand.direction.slot()];
        let better = slot.as_ref().map_or(true, |cur| {
            cand.score < cur.score || (cand.score == cur.score && cand.distance < cur.distance)
        });
        if better {
            *slot = Some(cand);
        }
    }
    slots.into_iter().flatten().collect()
}

/// 4-connected neighbour graph over corner candidates.
pub struct GridGraph {
    /// For each node, its accepted neighbors (at most one per direction).
    pub neighbors: Vec<Vec<NodeNeighbor>>,
}

impl GridGraph {
    /// Build the graph and keep only links confirmed from both ends.
    pub fn new(corners: &[Corner], axes: &GridAxes, params: &GridGraphParams) -> Self {
        if corners.is_empty() {
            return Self {
                neighbors: Vec::new(),
            };
        }
        let tree = build_tree(corners);
        let mut neighbors = Vec::with_capacity(corners.len());

        for (i, corner) in corners.iter().enumerate() {
            let q = [corner.position.x, corner.position.y];
            let candidates = tree
                .nearest_n::<SquaredEuclidean>(&q, params.k_neighbors.max(2))
                .into_iter()
                .map(|nn| nn.item as usize)
                .filter(|&j| j != i)
                .filter_map(|j| classify_neighbor(corner, &corners[j], j, axes, params))
                .collect();

            neighbors.push(select_neighbors(candidates));
        }

        let mut graph = Self { neighbors };
        graph.keep_mutual();
        graph
    }

    fn keep_mutual(&mut self) {
        let links: Vec<Vec<(usize, NeighborDirection)>> = self
            .neighbors
            .iter()
            .map(|ns| ns.iter().map(|n| (n.index, n.direction)).collect())
            .collect();

        for (a, ns) in self.neighbors.iter_mut().enumerate() {
            ns.retain(|n| links[n.index].contains(&(a, n.direction.opposite())));
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// Node sets of the graph's connected components, in order of their lowest
/// node index.
pub fn connected_components(graph: &GridGraph) -> Vec<Vec<usize>> {
    let n = graph.len();
    let mut seen = vec![false; n];
    let mut out = Vec::new();
    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let mut members = vec![root];
        let mut cursor = 0;
        while cursor < members.len() {
            let node = members[cursor];
            cursor += 1;
            for link in &graph.neighbors[node] {
                if !seen[link.index] {
                    seen[link.index] = true;
                    members.push(link.index);
                }
            }
        }
        out.push(members);
    }
    out
}

/// BFS over one component, returning `(node, i, j)` with the first node at
/// the origin.
pub fn assign_grid_coordinates(graph: &GridGraph, component: &[usize]) -> Vec<(usize, i32, i32)> {
    let Some(&root) = component.first() else {
        return Vec::new();
    };

    let mut placed = vec![false; graph.len()];
    let mut out = Vec::with_capacity(component.len());
    let mut queue = VecDeque::from([(root, 0, 0)]);
    placed[root] = true;

    while let Some((node, i, j)) = queue.pop_front() {
        out.push((node, i, j));
        for link in &graph.neighbors[node] {
            if placed[link.index] {
                continue;
            }
            placed[link.index] = true;
            let (di, dj) = link.direction.step();
            queue.push_back((link.index, i + di, j + dj));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn grid_corners(cols: usize, rows: usize, spacing: f32) -> Vec<Corner> {
        let mut corners = Vec::new();
        for j in 0..rows {
            for i in 0..cols {
                corners.push(Corner::new(
                    20.0 + i as f32 * spacing,
                    30.0 + j as f32 * spacing,
                    1.0,
                ));
            }
        }
        corners
    }

    fn by_direction(links: &[NodeNeighbor]) -> HashMap<NeighborDirection, usize> {
        links.iter().map(|n| (n.direction, n.index)).collect()
    }

    #[test]
    fn estimates_axes_and_spacing() {
        let corners = grid_corners(4, 3, 10.0);
        let axes = estimate_grid_axes(&corners, &GridGraphParams::default()).unwrap();
        approx::assert_abs_diff_eq!(10.0, axes.spacing, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(1.0, axes.u.x, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(1.0, axes.v.y, epsilon = 1e-4);
    }

    #[test]
    fn interior_corner_links_four_ways() {
        let cols = 3;
        let corners = grid_corners(cols, 3, 10.0);
        let params = GridGraphParams::default();
        let axes = estimate_grid_axes(&corners, &params).unwrap();
        let graph = GridGraph::new(&corners, &axes, &params);

        let idx = |i: usize, j: usize| j * cols + i;

        let center = by_direction(&graph.neighbors[idx(1, 1)]);
        assert_eq!(4, center.len());
        assert_eq!(idx(0, 1), center[&NeighborDirection::Left]);
        assert_eq!(idx(2, 1), center[&NeighborDirection::Right]);
        assert_eq!(idx(1, 0), center[&NeighborDirection::Up]);
        assert_eq!(idx(1, 2), center[&NeighborDirection::Down]);

        let top_left = by_direction(&graph.neighbors[idx(0, 0)]);
        assert_eq!(2, top_left.len());
        assert!(top_left.contains_key(&NeighborDirection::Right));
        assert!(top_left.contains_key(&NeighborDirection::Down));
    }

    #[test]
    fn drops_diagonal_and_far_candidates() {
        let axes = GridAxes {
            u: Vector2::new(1.0, 0.0),
            v: Vector2::new(0.0, 1.0),
            spacing: 10.0,
        };
        let corners = vec![
            Corner::new(0.0, 0.0, 1.0),
            Corner::new(7.0, 7.0, 1.0),  // diagonal
            Corner::new(30.0, 0.0, 1.0), // too far
        ];
        let graph = GridGraph::new(&corners, &axes, &GridGraphParams::default());
        assert!(graph.neighbors.iter().all(|n| n.is_empty()));
    }

    #[test]
    fn closest_aligned_candidate_wins() {
        let axes = GridAxes {
            u: Vector2::new(1.0, 0.0),
            v: Vector2::new(0.0, 1.0),
            spacing: 10.0,
        };
        let corners = vec![
            Corner::new(0.0, 0.0, 1.0),   // center (idx 0)
            Corner::new(10.0, 0.0, 1.0),  // better right (idx 1)
            Corner::new(12.5, 1.0, 1.0),  // worse right (idx 2)
            Corner::new(-10.0, 0.0, 1.0), // left (idx 3)
        ];
        let graph = GridGraph::new(&corners, &axes, &GridGraphParams::default());

        let map = by_direction(&graph.neighbors[0]);
        assert_eq!(2, map.len());
        assert_eq!(1, map[&NeighborDirection::Right]);
        assert_eq!(3, map[&NeighborDirection::Left]);
        // idx 2 sees idx 1 as its left neighbour, not the center: no mutual link.
        assert!(graph.neighbors[2]
            .iter()
            .all(|n| n.direction != NeighborDirection::Left || n.index != 0));
    }

    #[test]
    fn bfs_assigns_consistent_coordinates() {
        let cols = 4;
        let corners = grid_corners(cols, 3, 12.0);
        let params = GridGraphParams::default();
        let axes = estimate_grid_axes(&corners, &params).unwrap();
        let graph = GridGraph::new(&corners, &axes, &params);

        let components = connected_components(&graph);
        assert_eq!(1, components.len());
        let coords = assign_grid_coordinates(&graph, &components[0]);
        assert_eq!(12, coords.len());

        let (_, i0, j0) = coords.iter().copied().find(|c| c.0 == 0).unwrap();
        for (node, i, j) in coords {
            assert_eq!((node % cols) as i32, i - i0);
            assert_eq!((node / cols) as i32, j - j0);
        }
    }
}
