use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle. `width`/`height` count pixels, so a single
/// pixel has size 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box that contains every point, or `None` for an empty slice.
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Simplified closed outline of the board region.
///
/// Vertices are in frame pixel coordinates and the closing edge is implicit:
/// the first vertex is never repeated at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    pub vertices: Vec<[i32; 2]>,
}

impl BoundaryPolygon {
    pub fn from_points(points: &[Point<i32>]) -> Self {
        let mut vertices: Vec<[i32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { vertices }
    }

    pub fn points(&self) -> Vec<Point<i32>> {
        self.vertices.iter().map(|v| Point::new(v[0], v[1])).collect()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// A polygon needs three vertices to enclose any pixel.
    pub fn encloses_area(&self) -> bool {
        self.vertices.len() >= 3
    }
}
