//! Joint types and registration state.

use nalgebra::{Point2, Rotation2, Vector2};
use planar_types::{BodyId, JointId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of constraint a joint applies, with its geometry.
///
/// All anchor points and axes are given in world coordinates at creation
/// time; the world binds them to body-local offsets when the joint is
/// registered.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointKind {
    /// Bodies rotate around a shared anchor point.
    Pin {
        /// Shared anchor in world coordinates.
        anchor: Point2<f64>,
        /// Lower bound on the relative rotation (radians).
        lower_angle_limit: f64,
        /// Upper bound on the relative rotation (radians).
        upper_angle_limit: f64,
        /// Whether the angle limits are enforced.
        should_enable_limits: bool,
        /// Resistive torque opposing relative rotation.
        friction_torque: f64,
        /// Motor target for the relative angular velocity (rad/s).
        rotation_speed: f64,
    },
    /// A damped spring between two anchor points.
    Spring {
        /// Anchor on body A in world coordinates.
        anchor_a: Point2<f64>,
        /// Anchor on body B in world coordinates.
        anchor_b: Point2<f64>,
        /// Oscillation frequency in Hz.
        frequency: f64,
        /// Damping ratio (0 = undamped, 1 = critically damped).
        damping: f64,
    },
    /// Bodies are rigidly fused at an anchor.
    Fixed {
        /// Fusion anchor in world coordinates.
        anchor: Point2<f64>,
    },
    /// Bodies translate along a fixed axis through an anchor.
    Sliding {
        /// Anchor in world coordinates.
        anchor: Point2<f64>,
        /// Sliding axis (normalized at construction).
        axis: Vector2<f64>,
        /// Lower bound on the signed separation along the axis.
        lower_distance_limit: f64,
        /// Upper bound on the signed separation along the axis.
        upper_distance_limit: f64,
        /// Whether the distance limits are enforced.
        should_enable_limits: bool,
    },
    /// A rope-like maximum distance between two anchor points.
    Limit {
        /// Anchor on body A in world coordinates.
        anchor_a: Point2<f64>,
        /// Anchor on body B in world coordinates.
        anchor_b: Point2<f64>,
        /// Maximum allowed distance between the anchors.
        max_length: f64,
    },
}

/// A constraint linking two bodies.
///
/// The joint holds non-owning [`BodyId`] references to its endpoints; the
/// world owns both the joint and the bodies. `reaction_force` and
/// `reaction_torque` report what the solver applied to body B last step.
///
/// # Example
///
/// ```
/// use planar_constraint::Joint;
/// use planar_types::BodyId;
/// use nalgebra::Point2;
///
/// let joint = Joint::pin(BodyId::new(1), BodyId::new(2), Point2::new(0.0, 50.0))
///     .with_angle_limits(-0.5, 0.5);
/// assert_eq!(joint.body_a, BodyId::new(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    /// Identifier assigned by the world on registration.
    pub id: JointId,
    /// First endpoint body.
    pub body_a: BodyId,
    /// Second endpoint body.
    pub body_b: BodyId,
    /// The constraint kind and geometry.
    pub kind: JointKind,
    /// Force the solver applied to body B last step.
    pub reaction_force: Vector2<f64>,
    /// Torque the solver applied to body B last step.
    pub reaction_torque: f64,

    // Anchor binding, produced by `bind` at registration time.
    pub(crate) local_anchor_a: Vector2<f64>,
    pub(crate) local_anchor_b: Vector2<f64>,
    pub(crate) rest_angle: f64,
    pub(crate) rest_length: f64,
    pub(crate) bound: bool,
}

impl Joint {
    fn new(body_a: BodyId, body_b: BodyId, kind: JointKind) -> Self {
        Self {
            id: JointId::new(0),
            body_a,
            body_b,
            kind,
            reaction_force: Vector2::zeros(),
            reaction_torque: 0.0,
            local_anchor_a: Vector2::zeros(),
            local_anchor_b: Vector2::zeros(),
            rest_angle: 0.0,
            rest_length: 0.0,
            bound: false,
        }
    }

    /// A pin joint rotating both bodies around a shared world anchor.
    #[must_use]
    pub fn pin(body_a: BodyId, body_b: BodyId, anchor: Point2<f64>) -> Self {
        Self::new(
            body_a,
            body_b,
            JointKind::Pin {
                anchor,
                lower_angle_limit: 0.0,
                upper_angle_limit: 0.0,
                should_enable_limits: false,
                friction_torque: 0.0,
                rotation_speed: 0.0,
            },
        )
    }

    /// A damped spring between two world anchor points.
    #[must_use]
    pub fn spring(
        body_a: BodyId,
        body_b: BodyId,
        anchor_a: Point2<f64>,
        anchor_b: Point2<f64>,
    ) -> Self {
        Self::new(
            body_a,
            body_b,
            JointKind::Spring {
                anchor_a,
                anchor_b,
                frequency: 0.5,
                damping: 0.2,
            },
        )
    }

    /// A fixed joint fusing both bodies at a world anchor.
    #[must_use]
    pub fn fixed(body_a: BodyId, body_b: BodyId, anchor: Point2<f64>) -> Self {
        Self::new(body_a, body_b, JointKind::Fixed { anchor })
    }

    /// A sliding joint constraining motion to an axis through an anchor.
    #[must_use]
    pub fn sliding(
        body_a: BodyId,
        body_b: BodyId,
        anchor: Point2<f64>,
        axis: Vector2<f64>,
    ) -> Self {
        let norm = axis.norm();
        let axis = if norm > 1e-12 { axis / norm } else { Vector2::x() };
        Self::new(
            body_a,
            body_b,
            JointKind::Sliding {
                anchor,
                axis,
                lower_distance_limit: 0.0,
                upper_distance_limit: 0.0,
                should_enable_limits: false,
            },
        )
    }

    /// A distance-limit joint between two world anchor points.
    ///
    /// The maximum length defaults to the distance between the anchors at
    /// creation time.
    #[must_use]
    pub fn limit(
        body_a: BodyId,
        body_b: BodyId,
        anchor_a: Point2<f64>,
        anchor_b: Point2<f64>,
    ) -> Self {
        let max_length = (anchor_b - anchor_a).norm();
        Self::new(
            body_a,
            body_b,
            JointKind::Limit {
                anchor_a,
                anchor_b,
                max_length,
            },
        )
    }

    /// Enable and set angle limits on a pin joint (no-op for other kinds).
    #[must_use]
    pub fn with_angle_limits(mut self, lower: f64, upper: f64) -> Self {
        if let JointKind::Pin {
            lower_angle_limit,
            upper_angle_limit,
            should_enable_limits,
            ..
        } = &mut self.kind
        {
            *lower_angle_limit = lower;
            *upper_angle_limit = upper;
            *should_enable_limits = true;
        }
        self
    }

    /// Set the friction torque of a pin joint (no-op for other kinds).
    #[must_use]
    pub fn with_friction_torque(mut self, torque: f64) -> Self {
        if let JointKind::Pin {
            friction_torque, ..
        } = &mut self.kind
        {
            *friction_torque = torque.max(0.0);
        }
        self
    }

    /// Set the motor speed of a pin joint (no-op for other kinds).
    #[must_use]
    pub fn with_rotation_speed(mut self, speed: f64) -> Self {
        if let JointKind::Pin { rotation_speed, .. } = &mut self.kind {
            *rotation_speed = speed;
        }
        self
    }

    /// Set the spring response of a spring joint (no-op for other kinds).
    #[must_use]
    pub fn with_spring_response(mut self, frequency: f64, damping: f64) -> Self {
        if let JointKind::Spring {
            frequency: f,
            damping: d,
            ..
        } = &mut self.kind
        {
            *f = frequency.max(0.0);
            *d = damping.max(0.0);
        }
        self
    }

    /// Enable and set distance limits on a sliding joint (no-op for other
    /// kinds).
    #[must_use]
    pub fn with_distance_limits(mut self, lower: f64, upper: f64) -> Self {
        if let JointKind::Sliding {
            lower_distance_limit,
            upper_distance_limit,
            should_enable_limits,
            ..
        } = &mut self.kind
        {
            *lower_distance_limit = lower;
            *upper_distance_limit = upper;
            *should_enable_limits = true;
        }
        self
    }

    /// Set the maximum length of a limit joint (no-op for other kinds).
    #[must_use]
    pub fn with_max_length(mut self, length: f64) -> Self {
        if let JointKind::Limit { max_length, .. } = &mut self.kind {
            *max_length = length.max(0.0);
        }
        self
    }

    /// Bind the joint's world anchors to body-local offsets.
    ///
    /// Called by the world at registration time with the transforms of
    /// both endpoint bodies. Until bound, the solver ignores the joint.
    pub fn bind(
        &mut self,
        position_a: Point2<f64>,
        rotation_a: f64,
        position_b: Point2<f64>,
        rotation_b: f64,
    ) {
        let to_local_a = |p: &Point2<f64>| Rotation2::new(-rotation_a) * (p - position_a);
        let to_local_b = |p: &Point2<f64>| Rotation2::new(-rotation_b) * (p - position_b);

        let (world_a, world_b) = match &self.kind {
            JointKind::Pin { anchor, .. }
            | JointKind::Fixed { anchor }
            | JointKind::Sliding { anchor, .. } => (*anchor, *anchor),
            JointKind::Spring {
                anchor_a, anchor_b, ..
            }
            | JointKind::Limit {
                anchor_a, anchor_b, ..
            } => (*anchor_a, *anchor_b),
        };

        self.local_anchor_a = to_local_a(&world_a);
        self.local_anchor_b = to_local_b(&world_b);
        self.rest_angle = rotation_b - rotation_a;
        self.rest_length = (world_b - world_a).norm();
        self.bound = true;
    }

    /// Clear the anchor binding (the joint was removed from a world).
    pub fn unbind(&mut self) {
        self.bound = false;
        self.reaction_force = Vector2::zeros();
        self.reaction_torque = 0.0;
    }

    /// Whether the joint is currently registered with a world.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Whether the joint links the given body.
    #[must_use]
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}
