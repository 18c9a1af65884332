//! 2D rigid-body physics core.
//!
//! This crate provides the simulation world, shapes, bodies, continuous
//! collision detection, and spatial queries. It builds on the rest of the
//! workspace for data types, contact resolution, force fields, and joints.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      World::simulate                        │
//! │  host sync → fields → integration → joints → CCD →          │
//! │  narrow phase → contact diff → notification → host sync     │
//! └───────────┬─────────────────────────────────┬───────────────┘
//!             │                                 │
//!             ▼                                 ▼
//! ┌───────────────────────────┐   ┌───────────────────────────────┐
//! │           Body            │   │          SceneHost            │
//! │  Shape, mass/density,     │   │  owns positions + fields;     │
//! │  masks, forces, resting   │   │  adapts the host scene graph  │
//! └───────────────────────────┘   └───────────────────────────────┘
//! ```
//!
//! # Ownership
//!
//! The world owns the only collection of attached bodies and registered
//! joints. Bodies refer to their host node and to other bodies by
//! identifier, never by pointer, so removal is always safe and nothing
//! cycles. Positions are authoritative in the host: the world reads them
//! at the start of each step and writes the integrated results back at
//! the end.
//!
//! # Quick Start
//!
//! ```
//! use planar_core::{Body, SimpleScene, World};
//! use planar_types::{Transform2, WorldConfig};
//! use nalgebra::{Point2, Vector2};
//!
//! let mut scene = SimpleScene::new();
//! let mut world = World::new(
//!     WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0)),
//! );
//!
//! // A ball above a floor
//! let floor_node = scene.add_node(Transform2::identity());
//! world.add_body(
//!     Body::edge_chain(vec![Point2::new(-200.0, 0.0), Point2::new(200.0, 0.0)]),
//!     floor_node,
//!     Transform2::identity(),
//! );
//!
//! let ball_node = scene.add_node(Transform2::from_position(Point2::new(0.0, 100.0)));
//! let ball = world.add_body(
//!     Body::circle(10.0),
//!     ball_node,
//!     Transform2::from_position(Point2::new(0.0, 100.0)),
//! );
//!
//! for _ in 0..240 {
//!     world.simulate(1.0 / 60.0, &mut scene);
//! }
//!
//! // The ball ends up resting on the floor, not through it.
//! let y = world.body(ball).unwrap().position().y;
//! assert!(y > 9.0 && y < 12.0);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,      // mul_add style changes aren't always clearer
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod body;
mod query;
mod raycast;
mod scene;
mod shape;
mod world;

pub use body::{Body, DEFAULT_DENSITY};
pub use raycast::RaycastHit;
pub use scene::{ContactDelegate, SceneHost, SimpleScene};
pub use shape::Shape;
pub use world::World;

// Re-export the rest of the workspace for convenience
pub use planar_constraint::{BodyState, ConstraintSolver, ConstraintSolverConfig, Joint, JointKind};
pub use planar_contact::{Contact, ContactPair};
pub use planar_field::{Field, FieldContext, FieldKind, FlowMap, Region};
pub use planar_types::{
    Aabb, BodyId, JointId, NodeId, PhysicsError, Transform2, Velocity2, WorldConfig,
};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use nalgebra::{Point2, Vector2};

    fn attach(world: &mut World, scene: &mut SimpleScene, body: Body, at: Point2<f64>) -> BodyId {
        let transform = Transform2::from_position(at);
        let node = scene.add_node(transform);
        world.add_body(body, node, transform)
    }

    #[test]
    fn test_free_fall_matches_gravity() {
        let mut scene = SimpleScene::new();
        let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -10.0)));
        let mut ball = Body::circle(1.0);
        ball.linear_damping = 0.0;
        let id = attach(&mut world, &mut scene, ball, Point2::new(0.0, 0.0));

        world.simulate(1.0, &mut scene);

        let body = world.body(id).unwrap();
        // Semi-implicit Euler: v = -10 after one step, position moved by v*dt.
        assert!((body.velocity.y + 10.0).abs() < 1e-9);
        assert!((body.position().y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_world_writes_transforms_back_to_host() {
        let mut scene = SimpleScene::new();
        let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -10.0)));
        let transform = Transform2::from_position(Point2::new(0.0, 50.0));
        let node = scene.add_node(transform);
        world.add_body(Body::circle(1.0), node, transform);

        world.simulate(0.1, &mut scene);

        let synced = scene.node_transform(node).unwrap();
        assert!(synced.position.y < 50.0);
    }

    #[test]
    fn test_detached_node_makes_body_inert() {
        let mut scene = SimpleScene::new();
        let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -10.0)));
        let transform = Transform2::from_position(Point2::new(0.0, 50.0));
        let node = scene.add_node(transform);
        let id = world.add_body(Body::circle(1.0), node, transform);

        scene.remove_node(node);
        world.simulate(0.1, &mut scene);

        let body = world.body(id).unwrap();
        assert_eq!(body.position().y, 50.0, "inert bodies do not integrate");
        assert_eq!(body.velocity, Vector2::zeros());
    }

    #[test]
    fn test_joint_registration_is_mirrored_on_bodies() {
        let mut scene = SimpleScene::new();
        let mut world = World::default();
        let a = attach(&mut world, &mut scene, Body::circle(1.0), Point2::new(0.0, 0.0));
        let b = attach(&mut world, &mut scene, Body::circle(1.0), Point2::new(5.0, 0.0));

        let joint_id = world
            .add_joint(Joint::pin(a, b, Point2::new(2.5, 0.0)))
            .unwrap();
        assert_eq!(world.body(a).unwrap().joints(), &[joint_id]);
        assert_eq!(world.body(b).unwrap().joints(), &[joint_id]);

        world.remove_joint(joint_id);
        assert!(world.body(a).unwrap().joints().is_empty());
        assert!(world.body(b).unwrap().joints().is_empty());
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn test_add_joint_requires_attached_bodies() {
        let mut scene = SimpleScene::new();
        let mut world = World::default();
        let a = attach(&mut world, &mut scene, Body::circle(1.0), Point2::new(0.0, 0.0));

        let err = world
            .add_joint(Joint::pin(a, BodyId::new(999), Point2::origin()))
            .unwrap_err();
        assert_eq!(err, PhysicsError::JointBodyMissing(999));
    }

    #[test]
    fn test_remove_body_cleans_up_joints() {
        let mut scene = SimpleScene::new();
        let mut world = World::default();
        let a = attach(&mut world, &mut scene, Body::circle(1.0), Point2::new(0.0, 0.0));
        let b = attach(&mut world, &mut scene, Body::circle(1.0), Point2::new(5.0, 0.0));
        world
            .add_joint(Joint::spring(a, b, Point2::origin(), Point2::new(5.0, 0.0)))
            .unwrap();

        world.remove_body(a);
        assert_eq!(world.joint_count(), 0);
        assert!(world.body(b).unwrap().joints().is_empty());
    }
}
