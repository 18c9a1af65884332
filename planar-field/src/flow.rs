//! Flow maps: grids of velocity vectors sampled by flow-map fields.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A row-major grid of velocity vectors covering a field's region.
///
/// Row 0 is the bottom of the region. Samples between cells are bilinearly
/// interpolated; coordinates outside `[0, 1]` clamp to the border.
///
/// # Example
///
/// ```
/// use planar_field::FlowMap;
/// use nalgebra::Vector2;
///
/// // A 2x1 map blending from rightward to upward flow
/// let map = FlowMap::new(2, 1, vec![Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)]);
/// let mid = map.sample(0.5, 0.5);
/// assert!((mid.x - 0.5).abs() < 1e-12);
/// assert!((mid.y - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowMap {
    width: usize,
    height: usize,
    vectors: Vec<Vector2<f64>>,
}

impl FlowMap {
    /// Create a flow map from row-major vectors.
    ///
    /// # Panics
    ///
    /// Panics if `vectors.len() != width * height` or either dimension is
    /// zero.
    #[must_use]
    pub fn new(width: usize, height: usize, vectors: Vec<Vector2<f64>>) -> Self {
        assert!(width > 0 && height > 0, "FlowMap dimensions must be non-zero");
        assert_eq!(
            vectors.len(),
            width * height,
            "FlowMap requires width * height vectors"
        );
        Self {
            width,
            height,
            vectors,
        }
    }

    /// A uniform flow map (every cell the same vector).
    #[must_use]
    pub fn uniform(flow: Vector2<f64>) -> Self {
        Self::new(1, 1, vec![flow])
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample the map at normalized coordinates, bilinearly interpolated.
    #[must_use]
    pub fn sample(&self, u: f64, v: f64) -> Vector2<f64> {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        // Cell-centered sampling: u=0 maps to the center of column 0,
        // u=1 to the center of the last column.
        let fx = u * (self.width - 1) as f64;
        let fy = v * (self.height - 1) as f64;
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let at = |x: usize, y: usize| self.vectors[y * self.width + x];
        let bottom = at(x0, y0).lerp(&at(x1, y0), tx);
        let top = at(x0, y1).lerp(&at(x1, y1), tx);
        bottom.lerp(&top, ty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_sample() {
        let map = FlowMap::uniform(Vector2::new(3.0, -1.0));
        assert_eq!(map.sample(0.0, 0.0), Vector2::new(3.0, -1.0));
        assert_eq!(map.sample(0.7, 0.2), Vector2::new(3.0, -1.0));
    }

    #[test]
    fn test_bilinear_interpolation() {
        let map = FlowMap::new(
            2,
            2,
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(0.0, 1.0),
                Vector2::new(1.0, 1.0),
            ],
        );
        let center = map.sample(0.5, 0.5);
        assert_relative_eq!(center.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(center.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let map = FlowMap::new(2, 1, vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)]);
        assert_eq!(map.sample(-5.0, 0.0), Vector2::new(-1.0, 0.0));
        assert_eq!(map.sample(5.0, 0.0), Vector2::new(1.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "width * height")]
    fn test_wrong_length_panics() {
        let _ = FlowMap::new(2, 2, vec![Vector2::zeros(); 3]);
    }
}
