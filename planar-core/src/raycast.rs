//! Ray casting against axis-aligned boxes.
//!
//! One slab test serves both the query API (`raycast`, `raycast_all`,
//! `body_along_ray`) and the CCD sweep, which casts a body's movement
//! vector against Minkowski-expanded target boxes.

use nalgebra::{Point2, Vector2};
use planar_types::{Aabb, BodyId};

/// Direction components smaller than this are treated as axis-parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A ray hit against a body, reported by the world's ray queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The body that was hit.
    pub body: BodyId,
    /// Hit point in world coordinates.
    pub point: Point2<f64>,
    /// Outward face normal of the box at the hit point.
    pub normal: Vector2<f64>,
    /// Distance from the ray origin to the hit point.
    pub distance: f64,
}

/// A parametric hit against a single box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RayBoxHit {
    /// Entry parameter in units of the direction vector.
    pub t: f64,
    /// Outward face normal of the entered face.
    pub normal: Vector2<f64>,
}

/// Slab-test a ray against a box.
///
/// `direction` need not be normalized; the returned `t` is in units of it,
/// so `t = 1` is the direction vector's tip. Returns the entry hit with
/// `t >= 0`, or `None` when the ray misses or starts inside the box.
#[must_use]
pub(crate) fn ray_aabb(
    origin: Point2<f64>,
    direction: Vector2<f64>,
    aabb: &Aabb,
) -> Option<RayBoxHit> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    let mut entry_axis = 0usize;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if d.abs() < PARALLEL_EPSILON {
            // Parallel to this slab: must already be inside it.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = d.recip();
        let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            entry_axis = axis;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    // A negative entry means the origin is inside (or behind) the box.
    if t_enter < 0.0 {
        return None;
    }

    let mut normal = Vector2::zeros();
    normal[entry_axis] = -direction[entry_axis].signum();
    Some(RayBoxHit { t: t_enter, normal })
}
