//! Simulation configuration.

use nalgebra::Vector2;

use crate::PhysicsError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a simulation world.
///
/// # Example
///
/// ```
/// use planar_types::WorldConfig;
/// use nalgebra::Vector2;
///
/// // Pixel-scale gravity for a game scene
/// let config = WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// Gravitational acceleration applied to gravity-affected bodies.
    pub gravity: Vector2<f64>,
    /// Time multiplier applied to every `simulate` call. `1.0` is real
    /// time, `0.0` pauses the simulation.
    pub speed: f64,
    /// Bodies slower than this (linear and angular) accumulate rest time.
    pub resting_speed_threshold: f64,
    /// Seconds below the speed threshold before a body is put to rest.
    pub resting_delay: f64,
    /// Collision thickness given to edge segments, which have zero area.
    pub edge_thickness: f64,
    /// Separation left between a CCD-stopped body and the surface it hit.
    pub ccd_slop: f64,
    /// Maximum linear speed. Bodies exceeding this are clamped.
    pub max_linear_speed: Option<f64>,
    /// Maximum angular speed (rad/s). Bodies exceeding this are clamped.
    pub max_angular_speed: Option<f64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, -9.8),
            speed: 1.0,
            resting_speed_threshold: 0.15,
            resting_delay: 0.5,
            edge_thickness: 0.1,
            ccd_slop: 1e-3,
            max_linear_speed: Some(1.0e4),
            max_angular_speed: Some(1.0e3),
        }
    }
}

impl WorldConfig {
    /// Create a configuration with no gravity.
    #[must_use]
    pub fn zero_gravity() -> Self {
        Self {
            gravity: Vector2::zeros(),
            ..Default::default()
        }
    }

    /// Create a configuration with no speed clamping.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_linear_speed: None,
            max_angular_speed: None,
            ..Default::default()
        }
    }

    /// Set the gravity vector.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector2<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the simulation speed multiplier.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the resting thresholds.
    #[must_use]
    pub fn with_resting(mut self, speed_threshold: f64, delay: f64) -> Self {
        self.resting_speed_threshold = speed_threshold;
        self.resting_delay = delay;
        self
    }

    /// Set the collision thickness of edge segments.
    #[must_use]
    pub fn with_edge_thickness(mut self, thickness: f64) -> Self {
        self.edge_thickness = thickness;
        self
    }

    /// Check the configuration for invalid values.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.gravity.x.is_finite() || !self.gravity.y.is_finite() {
            return Err(PhysicsError::invalid_config("gravity must be finite"));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(PhysicsError::invalid_config(
                "speed must be finite and non-negative",
            ));
        }
        if self.resting_speed_threshold < 0.0 || self.resting_delay < 0.0 {
            return Err(PhysicsError::invalid_config(
                "resting thresholds must be non-negative",
            ));
        }
        if self.edge_thickness <= 0.0 {
            return Err(PhysicsError::invalid_config(
                "edge thickness must be positive",
            ));
        }
        Ok(())
    }
}
