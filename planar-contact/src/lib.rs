//! Contact records and impulse-based collision resolution.
//!
//! This crate provides the collision-response half of the physics core:
//!
//! - [`Contact`] - an immutable record of one collision event
//! - [`ContactPair`] - an order-independent pair key for contact tracking
//! - [`Manifold`] / [`aabb_manifold`] - narrow-phase AABB overlap geometry
//! - [`resolve_impulse`] / [`split_penetration`] - impulse resolution with
//!   restitution, Coulomb friction, and positional correction
//!
//! # Resolution Model
//!
//! Penetrating pairs are resolved with a single instantaneous impulse:
//!
//! ```text
//! j = (1 + min(e_a, e_b)) * (v_rel · n) / (1/m_a + 1/m_b)
//! ```
//!
//! where `n` is the contact normal pointing from body A toward body B and
//! a pinned or static body contributes zero inverse mass. Friction is
//! applied afterward along the tangent, capped by the averaged friction
//! coefficients times the normal impulse (Coulomb cone).
//!
//! # Example
//!
//! ```
//! use planar_contact::{aabb_manifold, resolve_impulse, ContactBody};
//! use planar_types::Aabb;
//! use nalgebra::{Point2, Vector2};
//!
//! let a = Aabb::from_center(Point2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
//! let b = Aabb::from_center(Point2::new(1.5, 0.0), Vector2::new(1.0, 1.0));
//!
//! let manifold = aabb_manifold(&a, &b).unwrap();
//! assert_eq!(manifold.normal, Vector2::new(1.0, 0.0));
//!
//! let left = ContactBody { inv_mass: 1.0, velocity: Vector2::new(1.0, 0.0), restitution: 1.0, friction: 0.0 };
//! let right = ContactBody { inv_mass: 1.0, velocity: Vector2::new(-1.0, 0.0), restitution: 1.0, friction: 0.0 };
//! let result = resolve_impulse(&left, &right, &manifold.normal, 0.0).unwrap();
//!
//! // Equal masses, head-on, fully elastic: velocities swap.
//! assert!((result.velocity_a.x + 1.0).abs() < 1e-12);
//! assert!((result.velocity_b.x - 1.0).abs() < 1e-12);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod contact;
mod manifold;
mod solver;

pub use contact::{Contact, ContactPair};
pub use manifold::{aabb_manifold, Manifold};
pub use solver::{resolve_impulse, split_penetration, ContactBody, ImpulseResult};
