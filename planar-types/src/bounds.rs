//! Axis-aligned bounding boxes.
//!
//! The collision pipeline is AABB-only: broad and narrow phase both operate
//! on [`Aabb`] overlap tests, and ray queries use the slab test against
//! these boxes.

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the box.
    pub min: Point2<f64>,
    /// Maximum corner of the box.
    pub max: Point2<f64>,
}

impl Aabb {
    /// Create a new AABB from minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with the given half-extents.
    #[must_use]
    pub fn from_center(center: Point2<f64>, half_extents: Vector2<f64>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Create an AABB from an origin corner and a size.
    #[must_use]
    pub fn from_origin_size(origin: Point2<f64>, size: Vector2<f64>) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// The smallest AABB containing all of the given points.
    ///
    /// An empty slice yields a zero box at the origin.
    #[must_use]
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let Some(first) = points.first() else {
            return Self::zero();
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// A zero-size box at the origin.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            min: Point2::origin(),
            max: Point2::origin(),
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Size of the box on each axis.
    #[must_use]
    pub fn extents(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Half the size of the box on each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vector2<f64> {
        (self.max - self.min) * 0.5
    }

    /// Check whether this box overlaps another on both axes.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check whether the box contains a point (inclusive).
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// The smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Expand the box by a uniform margin on all sides.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        self.expanded_by(Vector2::new(margin, margin))
    }

    /// Expand the box by per-axis half-extents (Minkowski sum with a box).
    #[must_use]
    pub fn expanded_by(&self, half_extents: Vector2<f64>) -> Self {
        Self {
            min: self.min - half_extents,
            max: self.max + half_extents,
        }
    }

    /// Translate the box by an offset.
    #[must_use]
    pub fn translated(&self, offset: Vector2<f64>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
