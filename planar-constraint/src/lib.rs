//! Constraint joints for the planar 2D physics simulation.
//!
//! A [`Joint`] links two bodies and restricts their relative motion. Five
//! kinds are supported:
//!
//! - **Pin** - bodies rotate around a shared anchor, with optional angle
//!   limits, friction torque, and a rotation-speed motor
//! - **Spring** - a damped spring between two anchor points
//! - **Fixed** - bodies are rigidly fused at an anchor
//! - **Sliding** - bodies translate along a fixed axis, with optional
//!   distance limits
//! - **Limit** - a rope-like maximum distance between two anchor points
//!
//! # Solver
//!
//! The [`ConstraintSolver`] computes corrective forces with a penalty
//! approach: stiff spring-damper responses to position and velocity error,
//! evaluated per joint per step against [`BodyState`] snapshots. The
//! forces it applies are recorded on each joint as
//! [`reaction_force`](Joint::reaction_force) and
//! [`reaction_torque`](Joint::reaction_torque).
//!
//! # Registration
//!
//! Joints are created freely and have no effect until registered with a
//! world, which cross-registers them on both bodies' joint lists and binds
//! their world-space anchors to body-local offsets. Removal reverses both.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod joint;
mod solver;

pub use joint::{Joint, JointKind};
pub use solver::{BodyState, ConstraintForce, ConstraintSolver, ConstraintSolverConfig};
