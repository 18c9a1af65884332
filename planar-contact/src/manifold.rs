//! Narrow-phase overlap geometry for axis-aligned boxes.

use nalgebra::{Point2, Vector2};
use planar_types::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Overlap geometry of two penetrating boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifold {
    /// Separation normal, pointing from box A toward box B.
    pub normal: Vector2<f64>,
    /// Penetration depth along the normal.
    pub penetration: f64,
    /// Midpoint of the overlapping region in world coordinates.
    pub point: Point2<f64>,
}

/// Compute the overlap manifold of two AABBs, or `None` when separated.
///
/// The penetration on each axis is `min(maxA - minB, maxB - minA)`; the
/// axis with the smaller overlap becomes the separation axis, and the
/// ordering of the box centers on that axis decides the normal's sign so
/// that it always points from A toward B.
#[must_use]
pub fn aabb_manifold(a: &Aabb, b: &Aabb) -> Option<Manifold> {
    if !a.overlaps(b) {
        return None;
    }

    let overlap_x = (a.max.x - b.min.x).min(b.max.x - a.min.x);
    let overlap_y = (a.max.y - b.min.y).min(b.max.y - a.min.y);

    // Midpoint of the intersection rectangle
    let region = Aabb::new(
        Point2::new(a.min.x.max(b.min.x), a.min.y.max(b.min.y)),
        Point2::new(a.max.x.min(b.max.x), a.max.y.min(b.max.y)),
    );
    let point = region.center();

    let (center_a, center_b) = (a.center(), b.center());
    if overlap_x < overlap_y {
        let sign = if center_a.x <= center_b.x { 1.0 } else { -1.0 };
        Some(Manifold {
            normal: Vector2::new(sign, 0.0),
            penetration: overlap_x,
            point,
        })
    } else {
        let sign = if center_a.y <= center_b.y { 1.0 } else { -1.0 };
        Some(Manifold {
            normal: Vector2::new(0.0, sign),
            penetration: overlap_y,
            point,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_separated_boxes_have_no_manifold() {
        let a = Aabb::from_center(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::from_center(Point2::new(5.0, 0.0), Vector2::new(1.0, 1.0));
        assert!(aabb_manifold(&a, &b).is_none());
    }

    #[test]
    fn test_least_penetration_axis_wins() {
        // Deep Y overlap, shallow X overlap: separate on X.
        let a = Aabb::from_center(Point2::new(0.0, 0.0), Vector2::new(1.0, 3.0));
        let b = Aabb::from_center(Point2::new(1.8, 0.0), Vector2::new(1.0, 3.0));
        let m = aabb_manifold(&a, &b).unwrap();
        assert_eq!(m.normal, Vector2::new(1.0, 0.0));
        assert_relative_eq!(m.penetration, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_points_from_a_to_b() {
        let a = Aabb::from_center(Point2::new(0.0, 1.8), Vector2::new(1.0, 1.0));
        let b = Aabb::from_center(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        // A sits above B, so the A-to-B normal points down.
        let m = aabb_manifold(&a, &b).unwrap();
        assert_eq!(m.normal, Vector2::new(0.0, -1.0));
    }

    #[test]
    fn test_contact_point_is_overlap_midpoint() {
        let a = Aabb::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
        let b = Aabb::new(Point2::new(1.0, 1.0), Point2::new(3.0, 3.0));
        let m = aabb_manifold(&a, &b).unwrap();
        assert_relative_eq!(m.point.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(m.point.y, 1.5, epsilon = 1e-12);
    }
}
