//! Body transform and velocity state types.
//!
//! A [`Transform2`] is the position and rotation of a body's owner in world
//! coordinates; a [`Velocity2`] is the body's linear and angular velocity.
//! Rotation is a plain angle in radians, counter-clockwise positive.

use nalgebra::{Point2, Rotation2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position and rotation of a body's owner in world coordinates.
///
/// # Example
///
/// ```
/// use planar_types::Transform2;
/// use nalgebra::Point2;
///
/// let t = Transform2::from_position(Point2::new(3.0, 4.0));
/// let world = t.transform_point(&Point2::new(1.0, 0.0));
/// assert_eq!(world, Point2::new(4.0, 4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform2 {
    /// Position in world coordinates.
    pub position: Point2<f64>,
    /// Rotation angle in radians (counter-clockwise).
    pub rotation: f64,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2 {
    /// Create an identity transform (origin, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point2::origin(),
            rotation: 0.0,
        }
    }

    /// Create a transform from position only (no rotation).
    #[must_use]
    pub fn from_position(position: Point2<f64>) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Create a transform from position and rotation.
    #[must_use]
    pub const fn from_position_rotation(position: Point2<f64>, rotation: f64) -> Self {
        Self { position, rotation }
    }

    /// Transform a point from local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point2<f64>) -> Point2<f64> {
        self.position + Rotation2::new(self.rotation) * local.coords
    }

    /// Transform a vector from local to world coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector2<f64>) -> Vector2<f64> {
        Rotation2::new(self.rotation) * local
    }

    /// Transform a point from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point2<f64>) -> Point2<f64> {
        Point2::from(Rotation2::new(-self.rotation) * (world - self.position))
    }

    /// Check that both position and rotation are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite() && self.rotation.is_finite()
    }
}

/// Linear and angular velocity of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Velocity2 {
    /// Linear velocity in world coordinates (units per second).
    pub linear: Vector2<f64>,
    /// Angular velocity in radians per second (counter-clockwise).
    pub angular: f64,
}

impl Default for Velocity2 {
    fn default() -> Self {
        Self::zero()
    }
}

impl Velocity2 {
    /// Create a new velocity.
    #[must_use]
    pub const fn new(linear: Vector2<f64>, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Zero velocity (at rest).
    #[must_use]
    pub fn zero() -> Self {
        Self {
            linear: Vector2::zeros(),
            angular: 0.0,
        }
    }

    /// Linear speed (magnitude of linear velocity).
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.linear.norm()
    }

    /// Angular speed (absolute angular velocity).
    #[must_use]
    pub fn angular_speed(&self) -> f64 {
        self.angular.abs()
    }

    /// Check whether both components are below a threshold.
    #[must_use]
    pub fn is_below(&self, threshold: f64) -> bool {
        self.speed() < threshold && self.angular_speed() < threshold
    }

    /// Check that all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.linear.x.is_finite() && self.linear.y.is_finite() && self.angular.is_finite()
    }
}
