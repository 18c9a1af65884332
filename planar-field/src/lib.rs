//! Force field generators for the planar 2D physics simulation.
//!
//! Fields live in the host's scene graph and apply forces to eligible
//! bodies every simulation step. This crate provides:
//!
//! - [`Field`] - a force generator with strength, falloff, region, masks,
//!   and an animated time accumulator
//! - [`FieldKind`] - the force law variants (drag, electric, linear and
//!   radial gravity, magnetic, noise, turbulence, velocity, flow-map,
//!   vortex, spring, custom)
//! - [`FieldContext`] - the per-body input a field is evaluated against
//! - [`Region`] - bounded areas of effect
//! - [`FlowMap`] - velocity grids for flow-map fields
//!
//! # Determinism
//!
//! Every force law is a pure function of its context: the noise and
//! turbulence kinds use fixed trigonometric mixes rather than random
//! numbers, and custom fields are required to be pure. Re-running a
//! simulation with the same inputs produces the same forces.
//!
//! # Example
//!
//! ```
//! use planar_field::{Field, FieldContext, Region};
//! use nalgebra::{Point2, Vector2};
//!
//! // A bounded attractor with inverse-square decay
//! let well = Field::radial_gravity()
//!     .with_strength(500.0)
//!     .with_falloff(2.0)
//!     .with_region(Region::Circle { radius: 200.0 });
//!
//! let near = well.force_on(&FieldContext::probe(
//!     Point2::new(10.0, 0.0),
//!     Point2::origin(),
//!     0.0,
//! ));
//! let far = well.force_on(&FieldContext::probe(
//!     Point2::new(100.0, 0.0),
//!     Point2::origin(),
//!     0.0,
//! ));
//! assert!(near.norm() > far.norm());
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::cast_precision_loss // Grid dimensions are far below 2^52
)]

mod field;
mod flow;
mod noise;

pub use field::{Field, FieldContext, FieldFunction, FieldKind, Region};
pub use flow::FlowMap;
pub use noise::noise_vector;
