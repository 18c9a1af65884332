//! Pure data types for the planar 2D physics simulation.
//!
//! This crate provides the foundational types shared by the rest of the
//! workspace:
//!
//! - [`BodyId`], [`NodeId`], [`JointId`] - opaque identifiers
//! - [`Transform2`] - position and rotation of a body's owner
//! - [`Velocity2`] - linear and angular velocity
//! - [`Aabb`] - axis-aligned bounding box for broad/narrow-phase tests
//! - [`WorldConfig`] - gravity, speed multiplier, solver thresholds
//! - [`PhysicsError`] - error type for simulation operations
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no physics, no integration, and
//! no collision logic. They are the common language between:
//!
//! - The simulation core (`planar-core`)
//! - Contact resolution (`planar-contact`)
//! - Constraint joints (`planar-constraint`)
//! - Force fields (`planar-field`)
//! - Host scene graphs embedding the simulation
//!
//! # Coordinate System
//!
//! 2D, right-handed: X right, Y up, angles in radians measured
//! counter-clockwise from the +X axis.
//!
//! # Example
//!
//! ```
//! use planar_types::{Transform2, Velocity2};
//! use nalgebra::{Point2, Vector2};
//!
//! let transform = Transform2::from_position(Point2::new(0.0, 100.0));
//! let velocity = Velocity2::new(Vector2::new(5.0, 0.0), 0.0);
//!
//! assert_eq!(transform.position.y, 100.0);
//! assert!(velocity.speed() > 0.0);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,      // mul_add style changes aren't always clearer
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod bounds;
mod config;
mod error;
mod id;
mod transform;

pub use bounds::Aabb;
pub use config::WorldConfig;
pub use error::PhysicsError;
pub use id::{BodyId, JointId, NodeId};
pub use transform::{Transform2, Velocity2};

// Re-export math types for convenience
pub use nalgebra::{Point2, Vector2};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_roundtrip() {
        let t = Transform2::from_position_rotation(
            Point2::new(1.0, 0.0),
            std::f64::consts::FRAC_PI_2,
        );

        // After a 90 degree rotation, local (1, 0) lands at (0, 1), plus
        // the (1, 0) translation.
        let world = t.transform_point(&Point2::new(1.0, 0.0));
        assert!((world.x - 1.0).abs() < 1e-10);
        assert!((world.y - 1.0).abs() < 1e-10);

        let local = t.inverse_transform_point(&world);
        assert!((local.x - 1.0).abs() < 1e-10);
        assert!(local.y.abs() < 1e-10);
    }

    #[test]
    fn test_aabb_overlap_is_symmetric() {
        let a = Aabb::from_center(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::from_center(Point2::new(1.5, 0.0), Vector2::new(1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }
}
