//! Penalty solver for joint constraints.
//!
//! The solver treats every constraint as a stiff spring-damper: position
//! error and velocity error at the joint anchors produce a corrective
//! force, applied equal-and-opposite to both bodies. Limits, motors, and
//! friction torques add their own terms. This keeps the solver a pure
//! function from joint + body states to forces; the world decides how to
//! apply them.

use nalgebra::{Point2, Rotation2, Vector2};

use crate::joint::{Joint, JointKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative angular speeds below this produce no friction torque.
const FRICTION_OMEGA_EPSILON: f64 = 1e-9;

/// 2D cross-product helper: rotate 90 degrees counter-clockwise.
#[inline]
fn perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Configuration for the constraint solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintSolverConfig {
    /// Linear penalty stiffness for position error.
    pub stiffness: f64,
    /// Linear penalty damping for velocity error.
    pub damping: f64,
    /// Angular penalty stiffness for rotation error.
    pub angular_stiffness: f64,
    /// Angular penalty damping for relative angular velocity.
    pub angular_damping: f64,
    /// Gain of the pin-joint rotation motor.
    pub motor_gain: f64,
}

impl Default for ConstraintSolverConfig {
    fn default() -> Self {
        Self {
            stiffness: 10_000.0,
            damping: 1_000.0,
            angular_stiffness: 5_000.0,
            angular_damping: 500.0,
            motor_gain: 100.0,
        }
    }
}

/// The slice of a body's state the solver reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Position in world coordinates.
    pub position: Point2<f64>,
    /// Rotation angle in radians.
    pub rotation: f64,
    /// Linear velocity.
    pub velocity: Vector2<f64>,
    /// Angular velocity in rad/s.
    pub angular_velocity: f64,
    /// Inverse mass (0 for static or pinned bodies).
    pub inv_mass: f64,
    /// Inverse moment of inertia (0 when rotation is locked).
    pub inv_inertia: f64,
}

impl BodyState {
    /// A static body state at a position.
    #[must_use]
    pub fn fixed(position: Point2<f64>) -> Self {
        Self {
            position,
            rotation: 0.0,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
        }
    }

    fn world_anchor(&self, local: Vector2<f64>) -> Point2<f64> {
        self.position + Rotation2::new(self.rotation) * local
    }

    fn velocity_at(&self, anchor: Point2<f64>) -> Vector2<f64> {
        self.velocity + perp(anchor - self.position) * self.angular_velocity
    }
}

/// Force and torque the solver wants applied to each endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintForce {
    /// Force on body A.
    pub force_a: Vector2<f64>,
    /// Torque on body A.
    pub torque_a: f64,
    /// Force on body B.
    pub force_b: Vector2<f64>,
    /// Torque on body B.
    pub torque_b: f64,
}

impl ConstraintForce {
    /// No force.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            force_a: Vector2::zeros(),
            torque_a: 0.0,
            force_b: Vector2::zeros(),
            torque_b: 0.0,
        }
    }

    /// Equal-and-opposite pair from the force/torque on body B.
    #[must_use]
    fn on_b(force: Vector2<f64>, torque: f64) -> Self {
        Self {
            force_a: -force,
            torque_a: -torque,
            force_b: force,
            torque_b: torque,
        }
    }
}

/// The penalty constraint solver.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSolver {
    config: ConstraintSolverConfig,
}

impl ConstraintSolver {
    /// Create a solver with the given configuration.
    #[must_use]
    pub fn new(config: ConstraintSolverConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ConstraintSolverConfig {
        &self.config
    }

    /// Solve one joint against its endpoint body states.
    ///
    /// Returns zero force for unbound joints and for joints whose bodies
    /// are both immovable.
    #[must_use]
    pub fn solve(&self, joint: &Joint, a: &BodyState, b: &BodyState) -> ConstraintForce {
        if !joint.is_bound() || (a.inv_mass <= 0.0 && b.inv_mass <= 0.0) {
            return ConstraintForce::zero();
        }

        match &joint.kind {
            JointKind::Pin {
                lower_angle_limit,
                upper_angle_limit,
                should_enable_limits,
                friction_torque,
                rotation_speed,
                ..
            } => self.solve_pin(
                joint,
                a,
                b,
                *should_enable_limits,
                *lower_angle_limit,
                *upper_angle_limit,
                *friction_torque,
                *rotation_speed,
            ),
            JointKind::Fixed { .. } => self.solve_fixed(joint, a, b),
            JointKind::Spring {
                frequency, damping, ..
            } => self.solve_spring(joint, a, b, *frequency, *damping),
            JointKind::Sliding {
                axis,
                lower_distance_limit,
                upper_distance_limit,
                should_enable_limits,
                ..
            } => self.solve_sliding(
                joint,
                a,
                b,
                *axis,
                *should_enable_limits,
                *lower_distance_limit,
                *upper_distance_limit,
            ),
            JointKind::Limit { max_length, .. } => self.solve_limit(joint, a, b, *max_length),
        }
    }

    /// Anchor positions and the velocity error between them.
    fn anchor_errors(
        joint: &Joint,
        a: &BodyState,
        b: &BodyState,
    ) -> (Vector2<f64>, Vector2<f64>) {
        let anchor_a = a.world_anchor(joint.local_anchor_a);
        let anchor_b = b.world_anchor(joint.local_anchor_b);
        let position_error = anchor_b - anchor_a;
        let velocity_error = b.velocity_at(anchor_b) - a.velocity_at(anchor_a);
        (position_error, velocity_error)
    }

    fn solve_fixed(&self, joint: &Joint, a: &BodyState, b: &BodyState) -> ConstraintForce {
        let (position_error, velocity_error) = Self::anchor_errors(joint, a, b);
        let force = -self.config.stiffness * position_error - self.config.damping * velocity_error;

        let angle_error = (b.rotation - a.rotation) - joint.rest_angle;
        let relative_omega = b.angular_velocity - a.angular_velocity;
        let torque = -self.config.angular_stiffness * angle_error
            - self.config.angular_damping * relative_omega;

        ConstraintForce::on_b(force, torque)
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_pin(
        &self,
        joint: &Joint,
        a: &BodyState,
        b: &BodyState,
        limits_enabled: bool,
        lower: f64,
        upper: f64,
        friction_torque: f64,
        rotation_speed: f64,
    ) -> ConstraintForce {
        let (position_error, velocity_error) = Self::anchor_errors(joint, a, b);
        let force = -self.config.stiffness * position_error - self.config.damping * velocity_error;

        let angle = (b.rotation - a.rotation) - joint.rest_angle;
        let relative_omega = b.angular_velocity - a.angular_velocity;
        let mut torque = 0.0;

        if limits_enabled {
            if angle < lower {
                torque += self.config.angular_stiffness * (lower - angle)
                    - self.config.angular_damping * relative_omega.min(0.0);
            } else if angle > upper {
                torque -= self.config.angular_stiffness * (angle - upper)
                    + self.config.angular_damping * relative_omega.max(0.0);
            }
        }

        if rotation_speed != 0.0 {
            torque += self.config.motor_gain * (rotation_speed - relative_omega);
        }

        if friction_torque > 0.0 && relative_omega.abs() > FRICTION_OMEGA_EPSILON {
            torque -= friction_torque * relative_omega.signum();
        }

        ConstraintForce::on_b(force, torque)
    }

    fn solve_spring(
        &self,
        joint: &Joint,
        a: &BodyState,
        b: &BodyState,
        frequency: f64,
        damping: f64,
    ) -> ConstraintForce {
        let (separation, velocity_error) = Self::anchor_errors(joint, a, b);
        let length = separation.norm();
        if length <= 1e-12 {
            return ConstraintForce::zero();
        }
        let direction = separation / length;

        let inv_sum = a.inv_mass + b.inv_mass;
        if inv_sum <= 0.0 {
            return ConstraintForce::zero();
        }
        let effective_mass = inv_sum.recip();

        // Map frequency/damping-ratio to spring constants.
        let omega = std::f64::consts::TAU * frequency;
        let k = effective_mass * omega * omega;
        let c = 2.0 * effective_mass * damping * omega;

        let stretch = length - joint.rest_length;
        let stretch_rate = velocity_error.dot(&direction);
        let force = direction * (-k * stretch - c * stretch_rate);

        ConstraintForce::on_b(force, 0.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_sliding(
        &self,
        joint: &Joint,
        a: &BodyState,
        b: &BodyState,
        axis: Vector2<f64>,
        limits_enabled: bool,
        lower: f64,
        upper: f64,
    ) -> ConstraintForce {
        let (separation, velocity_error) = Self::anchor_errors(joint, a, b);

        // Kill everything perpendicular to the axis.
        let perpendicular_error = separation - axis * separation.dot(&axis);
        let perpendicular_velocity = velocity_error - axis * velocity_error.dot(&axis);
        let mut force = -self.config.stiffness * perpendicular_error
            - self.config.damping * perpendicular_velocity;

        if limits_enabled {
            let along = separation.dot(&axis);
            let along_velocity = velocity_error.dot(&axis);
            if along < lower {
                force += axis
                    * (self.config.stiffness * (lower - along)
                        - self.config.damping * along_velocity.min(0.0));
            } else if along > upper {
                force -= axis
                    * (self.config.stiffness * (along - upper)
                        + self.config.damping * along_velocity.max(0.0));
            }
        }

        ConstraintForce::on_b(force, 0.0)
    }

    fn solve_limit(
        &self,
        joint: &Joint,
        a: &BodyState,
        b: &BodyState,
        max_length: f64,
    ) -> ConstraintForce {
        let (separation, velocity_error) = Self::anchor_errors(joint, a, b);
        let length = separation.norm();
        if length <= max_length || length <= 1e-12 {
            return ConstraintForce::zero();
        }
        let direction = separation / length;
        let separation_rate = velocity_error.dot(&direction).max(0.0);

        let force = direction
            * (-self.config.stiffness * (length - max_length)
                - self.config.damping * separation_rate);

        ConstraintForce::on_b(force, 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use planar_types::BodyId;

    fn dynamic_at(x: f64, y: f64) -> BodyState {
        BodyState {
            position: Point2::new(x, y),
            rotation: 0.0,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_inertia: 1.0,
        }
    }

    fn bound(mut joint: Joint, a: &BodyState, b: &BodyState) -> Joint {
        joint.bind(a.position, a.rotation, b.position, b.rotation);
        joint
    }

    #[test]
    fn test_unbound_joint_is_ignored() {
        let solver = ConstraintSolver::default();
        let joint = Joint::fixed(BodyId::new(1), BodyId::new(2), Point2::origin());
        let a = dynamic_at(0.0, 0.0);
        let b = dynamic_at(2.0, 0.0);
        assert_eq!(solver.solve(&joint, &a, &b), ConstraintForce::zero());
    }

    #[test]
    fn test_fixed_joint_opposes_drift() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(2.0, 0.0);
        let joint = bound(
            Joint::fixed(BodyId::new(1), BodyId::new(2), Point2::new(1.0, 0.0)),
            &a,
            &b,
        );

        // B drifts away from its bound offset.
        b.position.x = 2.5;
        let force = solver.solve(&joint, &a, &b);
        assert!(force.force_b.x < 0.0, "pulls B back");
        assert!(force.force_a.x > 0.0, "pulls A forward");
        assert_eq!(force.force_a, -force.force_b);
    }

    #[test]
    fn test_fixed_joint_locks_relative_rotation() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(2.0, 0.0);
        let joint = bound(
            Joint::fixed(BodyId::new(1), BodyId::new(2), Point2::new(1.0, 0.0)),
            &a,
            &b,
        );

        b.rotation = 0.3;
        let force = solver.solve(&joint, &a, &b);
        assert!(force.torque_b < 0.0, "untwists B");
    }

    #[test]
    fn test_spring_at_rest_length_is_quiet() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let b = dynamic_at(10.0, 0.0);
        let joint = bound(
            Joint::spring(
                BodyId::new(1),
                BodyId::new(2),
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
            ),
            &a,
            &b,
        );
        let force = solver.solve(&joint, &a, &b);
        assert!(force.force_b.norm() < 1e-9);
    }

    #[test]
    fn test_spring_restores_toward_rest_length() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(10.0, 0.0);
        let joint = bound(
            Joint::spring(
                BodyId::new(1),
                BodyId::new(2),
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
            )
            .with_spring_response(1.0, 0.1),
            &a,
            &b,
        );

        // Stretched: pulls together.
        b.position.x = 14.0;
        let stretched = solver.solve(&joint, &a, &b);
        assert!(stretched.force_b.x < 0.0);

        // Compressed: pushes apart.
        b.position.x = 6.0;
        let compressed = solver.solve(&joint, &a, &b);
        assert!(compressed.force_b.x > 0.0);
    }

    #[test]
    fn test_sliding_constrains_off_axis_motion() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(3.0, 0.0);
        let joint = bound(
            Joint::sliding(
                BodyId::new(1),
                BodyId::new(2),
                Point2::new(0.0, 0.0),
                Vector2::x(),
            ),
            &a,
            &b,
        );

        // On-axis motion is free.
        b.position.x = 7.0;
        let along = solver.solve(&joint, &a, &b);
        assert!(along.force_b.norm() < 1e-9);

        // Off-axis motion is resisted.
        b.position.y = 0.5;
        let off = solver.solve(&joint, &a, &b);
        assert!(off.force_b.y < 0.0);
    }

    #[test]
    fn test_sliding_distance_limits() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(3.0, 0.0);
        let joint = bound(
            Joint::sliding(
                BodyId::new(1),
                BodyId::new(2),
                Point2::new(0.0, 0.0),
                Vector2::x(),
            )
            .with_distance_limits(-5.0, 5.0),
            &a,
            &b,
        );

        b.position.x = 9.0; // separation 6, past the upper limit
        let force = solver.solve(&joint, &a, &b);
        assert!(force.force_b.x < 0.0, "pushed back inside the limits");
    }

    #[test]
    fn test_limit_joint_is_one_sided() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(4.0, 0.0);
        let joint = bound(
            Joint::limit(
                BodyId::new(1),
                BodyId::new(2),
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
            )
            .with_max_length(5.0),
            &a,
            &b,
        );

        // Inside the limit: rope is slack.
        let slack = solver.solve(&joint, &a, &b);
        assert_eq!(slack, ConstraintForce::zero());

        // Beyond the limit: pulled back.
        b.position.x = 7.0;
        let taut = solver.solve(&joint, &a, &b);
        assert!(taut.force_b.x < 0.0);
    }

    #[test]
    fn test_pin_motor_drives_relative_rotation() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let b = dynamic_at(2.0, 0.0);
        let joint = bound(
            Joint::pin(BodyId::new(1), BodyId::new(2), Point2::new(1.0, 0.0))
                .with_rotation_speed(2.0),
            &a,
            &b,
        );
        let force = solver.solve(&joint, &a, &b);
        assert!(force.torque_b > 0.0, "motor spins B up");
    }

    #[test]
    fn test_pin_angle_limits_engage_only_outside() {
        let solver = ConstraintSolver::default();
        let a = dynamic_at(0.0, 0.0);
        let mut b = dynamic_at(2.0, 0.0);
        let joint = bound(
            Joint::pin(BodyId::new(1), BodyId::new(2), Point2::new(1.0, 0.0))
                .with_angle_limits(-0.5, 0.5),
            &a,
            &b,
        );

        b.rotation = 0.2;
        let inside = solver.solve(&joint, &a, &b);
        assert_eq!(inside.torque_b, 0.0);

        b.rotation = 0.8;
        let outside = solver.solve(&joint, &a, &b);
        assert!(outside.torque_b < 0.0, "pushed back below the upper limit");
    }

    #[test]
    fn test_both_static_endpoints_short_circuit() {
        let solver = ConstraintSolver::default();
        let a = BodyState::fixed(Point2::new(0.0, 0.0));
        let b = BodyState::fixed(Point2::new(9.0, 0.0));
        let joint = bound(
            Joint::fixed(BodyId::new(1), BodyId::new(2), Point2::new(1.0, 0.0)),
            &a,
            &b,
        );
        assert_eq!(solver.solve(&joint, &a, &b), ConstraintForce::zero());
    }
}
