//! Deterministic noise for the noise and turbulence fields.
//!
//! These are not random: the "noise" is a fixed multi-octave mix of sine
//! and cosine terms over position and field time, so a replayed simulation
//! produces identical forces. Incommensurate frequencies keep the pattern
//! from visibly repeating at scene scale.

use nalgebra::{Point2, Vector2};

/// Evaluate the noise direction at a position and field time.
///
/// `smoothness` in `[0, 1]` attenuates the higher octaves: at `1.0` only
/// the base octave remains, at `0.0` all three contribute. Components stay
/// within roughly `[-1.75, 1.75]`.
#[must_use]
pub fn noise_vector(position: Point2<f64>, time: f64, smoothness: f64) -> Vector2<f64> {
    let roughness = 1.0 - smoothness.clamp(0.0, 1.0);

    let x = (0.013 * position.x + 1.7 * time).sin()
        + roughness * 0.5 * (0.071 * position.x - 0.9 * time).sin()
        + roughness * 0.25 * (0.173 * position.y + 2.3 * time).cos();
    let y = (0.017 * position.y - 1.3 * time).cos()
        + roughness * 0.5 * (0.067 * position.y + 1.1 * time).cos()
        + roughness * 0.25 * (0.151 * position.x - 1.9 * time).sin();

    Vector2::new(x, y)
}
