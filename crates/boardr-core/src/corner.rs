use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Raw corner candidate produced by a corner detector.
///
/// This is the thing you obtain by adapting the output of a ChESS-style
/// detector, before any grid structure is known.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    /// Corner position in pixel coordinates.
    pub position: Point2<f32>,

    /// Strength / response of the corner detector.
    pub strength: f32,
}

impl Corner {
    pub fn new(x: f32, y: f32, strength: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            strength,
        }
    }

    /// Convenience accessor for (x, y) as a vector.
    pub fn as_vec2(&self) -> Vector2<f32> {
        Vector2::new(self.position.x, self.position.y)
    }
}

/// Pattern dimensions counted in *inner* corners.
///
/// `width` is the number of corners along one row, `height` the number of
/// rows. A board with 10x7 squares has a `PatternSize` of 9x6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternSize {
    pub width: u32,
    pub height: u32,
}

impl PatternSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of inner corners.
    #[inline]
    pub fn count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Same pattern with the two axes swapped.
    #[inline]
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Both dimensions are at least 2, the smallest grid with an interior.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width >= 2 && self.height >= 2
    }
}

impl std::fmt::Display for PatternSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
