//! Impulse resolution for penetrating pairs.
//!
//! The solver is stateless: it takes a per-body view of the quantities that
//! matter for resolution and returns the post-impulse velocities. The
//! caller (the world) owns the bodies and decides what to write back.

use nalgebra::Vector2;

/// Tangential speeds below this are treated as not sliding.
const FRICTION_SPEED_EPSILON: f64 = 1e-9;

/// The slice of a body's state that contact resolution needs.
///
/// A pinned or static body is expressed by `inv_mass = 0.0`; it absorbs
/// impulses without moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    /// Inverse mass (0 for static or pinned bodies).
    pub inv_mass: f64,
    /// Linear velocity.
    pub velocity: Vector2<f64>,
    /// Restitution coefficient, 0 (inelastic) to 1 (elastic).
    pub restitution: f64,
    /// Coulomb friction coefficient.
    pub friction: f64,
}

/// Outcome of resolving one contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseResult {
    /// Magnitude of the normal impulse.
    pub normal_impulse: f64,
    /// Post-impulse velocity of body A.
    pub velocity_a: Vector2<f64>,
    /// Post-impulse velocity of body B.
    pub velocity_b: Vector2<f64>,
}

/// Resolve a penetrating contact with an instantaneous impulse.
///
/// `normal` must point from body A toward body B. Returns `None` when the
/// bodies are separating along the normal or when neither body can move
/// (both inverse masses zero), in which case no impulse applies.
///
/// Restitution uses `min(e_a, e_b)`, suppressed when the approach speed
/// is at or below `restitution_threshold`: resting contact re-collides
/// every step as gravity pulls the body back in, and bouncing those
/// micro-impacts would keep it jittering forever. A couple of frames'
/// worth of gravity is a good threshold; pass `0.0` to always bounce.
/// Friction is applied afterward along the tangent, capped by the
/// averaged friction coefficients times the normal impulse magnitude.
#[must_use]
pub fn resolve_impulse(
    a: &ContactBody,
    b: &ContactBody,
    normal: &Vector2<f64>,
    restitution_threshold: f64,
) -> Option<ImpulseResult> {
    let inv_sum = a.inv_mass + b.inv_mass;
    if inv_sum <= 0.0 {
        return None;
    }

    // Relative velocity of A with respect to B; positive along the A-to-B
    // normal means the bodies are approaching.
    let relative = a.velocity - b.velocity;
    let approach = relative.dot(normal);
    if approach <= 0.0 {
        return None;
    }

    let restitution = if approach > restitution_threshold {
        a.restitution.min(b.restitution)
    } else {
        0.0
    };
    let j = (1.0 + restitution) * approach / inv_sum;

    let mut velocity_a = a.velocity - normal * (j * a.inv_mass);
    let mut velocity_b = b.velocity + normal * (j * b.inv_mass);

    // Coulomb friction along the tangent of the post-impulse velocities.
    let post = velocity_a - velocity_b;
    let tangential = post - normal * post.dot(normal);
    let sliding_speed = tangential.norm();
    if sliding_speed > FRICTION_SPEED_EPSILON {
        let tangent = tangential / sliding_speed;
        let friction = 0.5 * (a.friction + b.friction);
        // Impulse that would cancel sliding entirely, capped by the cone.
        let jt = (sliding_speed / inv_sum).min(friction * j);
        velocity_a -= tangent * (jt * a.inv_mass);
        velocity_b += tangent * (jt * b.inv_mass);
    }

    Some(ImpulseResult {
        normal_impulse: j,
        velocity_a,
        velocity_b,
    })
}

/// Split a penetration vector between the movable bodies of a pair.
///
/// Returns the position corrections `(delta_a, delta_b)`: half each when
/// both bodies can move, the full correction to the single movable body
/// otherwise, and zero for a fully static pair.
#[must_use]
pub fn split_penetration(
    normal: &Vector2<f64>,
    penetration: f64,
    movable_a: bool,
    movable_b: bool,
) -> (Vector2<f64>, Vector2<f64>) {
    let full = normal * penetration;
    match (movable_a, movable_b) {
        (true, true) => (-full * 0.5, full * 0.5),
        (true, false) => (-full, Vector2::zeros()),
        (false, true) => (Vector2::zeros(), full),
        (false, false) => (Vector2::zeros(), Vector2::zeros()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body(inv_mass: f64, vx: f64, restitution: f64, friction: f64) -> ContactBody {
        ContactBody {
            inv_mass,
            velocity: Vector2::new(vx, 0.0),
            restitution,
            friction,
        }
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let a = body(1.0, 2.0, 1.0, 0.0);
        let b = body(1.0, -2.0, 1.0, 0.0);
        let r = resolve_impulse(&a, &b, &Vector2::x(), 0.0).unwrap();
        assert_relative_eq!(r.velocity_a.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(r.velocity_b.x, 2.0, epsilon = 1e-12);
        // Relative speed along the normal is preserved.
        let before = (a.velocity - b.velocity).dot(&Vector2::x()).abs();
        let after = (r.velocity_a - r.velocity_b).dot(&Vector2::x()).abs();
        assert_relative_eq!(before, after, epsilon = 1e-12);
    }

    #[test]
    fn test_inelastic_against_static_body_stops() {
        let a = body(1.0, 3.0, 0.0, 0.0);
        let wall = body(0.0, 0.0, 0.0, 0.0);
        let r = resolve_impulse(&a, &wall, &Vector2::x(), 0.0).unwrap();
        assert_relative_eq!(r.velocity_a.x, 0.0, epsilon = 1e-12);
        assert_eq!(r.velocity_b, Vector2::zeros());
        assert_relative_eq!(r.normal_impulse, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_separating_pair_is_skipped() {
        let a = body(1.0, -1.0, 0.5, 0.0);
        let b = body(1.0, 1.0, 0.5, 0.0);
        assert!(resolve_impulse(&a, &b, &Vector2::x(), 0.0).is_none());
    }

    #[test]
    fn test_two_static_bodies_are_skipped() {
        let a = body(0.0, 1.0, 0.5, 0.0);
        let b = body(0.0, -1.0, 0.5, 0.0);
        assert!(resolve_impulse(&a, &b, &Vector2::x(), 0.0).is_none());
    }

    #[test]
    fn test_friction_opposes_sliding() {
        // Falling onto the ground while sliding in +X.
        let a = ContactBody {
            inv_mass: 1.0,
            velocity: Vector2::new(4.0, -10.0),
            restitution: 0.0,
            friction: 0.5,
        };
        let ground = ContactBody {
            inv_mass: 0.0,
            velocity: Vector2::zeros(),
            restitution: 0.0,
            friction: 0.5,
        };
        // Normal from the body toward the ground is -Y.
        let r = resolve_impulse(&a, &ground, &-Vector2::y(), 0.0).unwrap();
        assert_relative_eq!(r.velocity_a.y, 0.0, epsilon = 1e-12);
        assert!(r.velocity_a.x < 4.0);
        assert!(r.velocity_a.x >= 0.0, "friction must not reverse sliding");
    }

    #[test]
    fn test_slow_approach_suppresses_restitution() {
        let a = body(1.0, 0.5, 1.0, 0.0);
        let wall = body(0.0, 0.0, 1.0, 0.0);
        let r = resolve_impulse(&a, &wall, &Vector2::x(), 1.0).unwrap();
        // Below the threshold the bounce is fully inelastic.
        assert_relative_eq!(r.velocity_a.x, 0.0, epsilon = 1e-12);

        let fast = body(1.0, 5.0, 1.0, 0.0);
        let r = resolve_impulse(&fast, &wall, &Vector2::x(), 1.0).unwrap();
        assert_relative_eq!(r.velocity_a.x, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_penetration_split() {
        let n = Vector2::y();
        let (da, db) = split_penetration(&n, 0.4, true, true);
        assert_relative_eq!(da.y, -0.2, epsilon = 1e-12);
        assert_relative_eq!(db.y, 0.2, epsilon = 1e-12);

        let (da, db) = split_penetration(&n, 0.4, true, false);
        assert_relative_eq!(da.y, -0.4, epsilon = 1e-12);
        assert_eq!(db, Vector2::zeros());

        let (da, db) = split_penetration(&n, 0.4, false, false);
        assert_eq!(da, Vector2::zeros());
        assert_eq!(db, Vector2::zeros());
    }
}
