//! 2D image to 3D object point correspondences collected across views.

use crate::PatternSize;
use log::info;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Errors returned by [`CorrespondenceAccumulator`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CorrespondenceError {
    #[error("target_count must be >= 1")]
    InvalidTargetCount,
    #[error("pattern {0} is invalid (both dimensions must be >= 2)")]
    InvalidPattern(PatternSize),
    #[error("expected {expected} corners for the pattern, got {got}")]
    CornerCountMismatch { expected: usize, got: usize },
    #[error("accumulator already holds its target of {target} views")]
    AlreadyComplete { target: usize },
}

/// One accepted view: detected corners and their pattern-space coordinates.
///
/// `image_points[k]` and `object_points[k]` describe the same physical
/// corner. Both have `pattern.count()` entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    pub image_points: Vec<Point2<f32>>,
    pub object_points: Vec<Point3<f32>>,
}

impl CorrespondenceSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.image_points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image_points.is_empty()
    }
}

/// Object points for `pattern` in row-major order.
///
/// Entry `j` is `(j / width, j % width, 0)`, i.e. `(row, col, 0)` in units of
/// one square. The order must match the corner order of the detector that
/// produced the image points; this is not checked here.
pub fn object_points(pattern: PatternSize) -> Vec<Point3<f32>> {
    let w = pattern.width as usize;
    (0..pattern.count())
        .map(|j| Point3::new((j / w) as f32, (j % w) as f32, 0.0))
        .collect()
}

/// Append-only store of accepted views, bounded by a target count.
#[derive(Clone, Debug)]
pub struct CorrespondenceAccumulator {
    pattern: PatternSize,
    target_count: usize,
    template: Vec<Point3<f32>>,
    sets: Vec<CorrespondenceSet>,
}

impl CorrespondenceAccumulator {
    pub fn new(pattern: PatternSize, target_count: usize) -> Result<Self, CorrespondenceError> {
        if target_count < 1 {
            return Err(CorrespondenceError::InvalidTargetCount);
        }
        if !pattern.is_valid() {
            return Err(CorrespondenceError::InvalidPattern(pattern));
        }
        Ok(Self {
            pattern,
            target_count,
            template: object_points(pattern),
            sets: Vec::with_capacity(target_count),
        })
    }

    /// Accept one detected view and return the number of accepted views.
    ///
    /// Corners must be ordered row-major with `pattern.width` corners per
    /// row. Rejected views leave the accumulator untouched.
    pub fn accept(&mut self, corners: Vec<Point2<f32>>) -> Result<usize, CorrespondenceError> {
        if self.is_complete() {
            return Err(CorrespondenceError::AlreadyComplete {
                target: self.target_count,
            });
        }
        let expected = self.pattern.count();
        if corners.len() != expected {
            return Err(CorrespondenceError::CornerCountMismatch {
                expected,
                got: corners.len(),
            });
        }

        self.sets.push(CorrespondenceSet {
            image_points: corners,
            object_points: self.template.clone(),
        });

        info!(
            "collected {} of {} needed chessboard views",
            self.sets.len(),
            self.target_count
        );
        Ok(self.sets.len())
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.sets.len() == self.target_count
    }

    #[inline]
    pub fn pattern(&self) -> PatternSize {
        self.pattern
    }

    #[inline]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Number of accepted views.
    #[inline]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.target_count - self.sets.len()
    }

    pub fn sets(&self) -> &[CorrespondenceSet] {
        &self.sets
    }

    pub fn into_sets(self) -> Vec<CorrespondenceSet> {
        self.sets
    }
}
