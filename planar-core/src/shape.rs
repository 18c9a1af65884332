//! Geometric shapes for collision bodies.
//!
//! [`Shape`] is a closed tagged union: collision and bounds code matches
//! exhaustively, so adding a variant forces a review of every consumer.
//! Area and bounds are pure functions of the variant. Edge shapes have
//! zero area and are not meant to move; they collide through thin
//! per-segment boxes rather than their filled bounding box.

use nalgebra::{Point2, Vector2};
use planar_types::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A collision shape in body-local coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// A rectangle centered on the body origin.
    Rectangle {
        /// Full width and height.
        size: Vector2<f64>,
    },
    /// A rectangle centered on an offset from the body origin.
    RectangleOffset {
        /// Full width and height.
        size: Vector2<f64>,
        /// Center offset from the body origin.
        center: Vector2<f64>,
    },
    /// A circle centered on the body origin.
    Circle {
        /// Circle radius.
        radius: f64,
    },
    /// A circle centered on an offset from the body origin.
    CircleOffset {
        /// Circle radius.
        radius: f64,
        /// Center offset from the body origin.
        center: Vector2<f64>,
    },
    /// The border of a rectangle (hollow).
    EdgeLoop {
        /// The rectangle whose border forms the loop.
        rect: Aabb,
    },
    /// A closed polyline border; the last point connects back to the first.
    EdgeLoopPath {
        /// Loop vertices in body-local coordinates.
        points: Vec<Point2<f64>>,
    },
    /// An open polyline border.
    EdgeChain {
        /// Chain vertices in body-local coordinates.
        points: Vec<Point2<f64>>,
    },
    /// A filled convex polygon.
    Polygon {
        /// Polygon vertices in counter-clockwise order.
        points: Vec<Point2<f64>>,
    },
    /// A union of sub-shapes treated as one body.
    Compound {
        /// The member shapes.
        parts: Vec<Shape>,
    },
}

impl Shape {
    /// A rectangle centered on the body origin.
    #[must_use]
    pub fn rectangle(size: Vector2<f64>) -> Self {
        Self::Rectangle { size }
    }

    /// A circle centered on the body origin.
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self::Circle { radius }
    }

    /// The border of a rectangle.
    #[must_use]
    pub fn edge_loop(rect: Aabb) -> Self {
        Self::EdgeLoop { rect }
    }

    /// A filled convex polygon.
    #[must_use]
    pub fn polygon(points: Vec<Point2<f64>>) -> Self {
        Self::Polygon { points }
    }

    /// A union of sub-shapes.
    #[must_use]
    pub fn compound(parts: Vec<Shape>) -> Self {
        Self::Compound { parts }
    }

    /// The enclosed area of the shape.
    ///
    /// Edge shapes enclose nothing; polygons with fewer than three points
    /// are degenerate and yield zero.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Rectangle { size } | Self::RectangleOffset { size, .. } => {
                (size.x * size.y).abs()
            }
            Self::Circle { radius } | Self::CircleOffset { radius, .. } => {
                std::f64::consts::PI * radius * radius
            }
            Self::EdgeLoop { .. } | Self::EdgeLoopPath { .. } | Self::EdgeChain { .. } => 0.0,
            Self::Polygon { points } => polygon_area(points),
            Self::Compound { parts } => parts.iter().map(Self::area).sum(),
        }
    }

    /// Whether this is an edge shape (zero area, not meant to move).
    #[must_use]
    pub fn is_edge(&self) -> bool {
        match self {
            Self::EdgeLoop { .. } | Self::EdgeLoopPath { .. } | Self::EdgeChain { .. } => true,
            Self::Compound { parts } => parts.iter().all(Self::is_edge),
            _ => false,
        }
    }

    /// The shape's bounding box in body-local coordinates.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Self::Rectangle { size } => Aabb::from_center(Point2::origin(), size * 0.5),
            Self::RectangleOffset { size, center } => {
                Aabb::from_center(Point2::origin() + center, size * 0.5)
            }
            Self::Circle { radius } => {
                Aabb::from_center(Point2::origin(), Vector2::new(*radius, *radius))
            }
            Self::CircleOffset { radius, center } => {
                Aabb::from_center(Point2::origin() + center, Vector2::new(*radius, *radius))
            }
            Self::EdgeLoop { rect } => *rect,
            Self::EdgeLoopPath { points } | Self::EdgeChain { points } | Self::Polygon { points } => {
                Aabb::from_points(points)
            }
            Self::Compound { parts } => {
                let mut iter = parts.iter().map(Self::local_bounds);
                let Some(first) = iter.next() else {
                    return Aabb::zero();
                };
                iter.fold(first, |acc, b| acc.union(&b))
            }
        }
    }

    /// Half-extents of the local bounding box.
    #[must_use]
    pub fn half_extents(&self) -> Vector2<f64> {
        self.local_bounds().half_extents()
    }

    /// Append the shape's collision boxes, placed at a world position.
    ///
    /// Solid shapes contribute their bounding box. Edge shapes contribute
    /// one thin box per segment so that bodies inside a loop collide with
    /// its border instead of its interior. Compound shapes recurse.
    pub fn collision_boxes(&self, position: Point2<f64>, thickness: f64, out: &mut Vec<Aabb>) {
        let offset = position.coords;
        match self {
            Self::Rectangle { .. }
            | Self::RectangleOffset { .. }
            | Self::Circle { .. }
            | Self::CircleOffset { .. }
            | Self::Polygon { .. } => {
                out.push(self.local_bounds().translated(offset));
            }
            Self::EdgeLoop { rect } => {
                let (min, max) = (rect.min, rect.max);
                let corners = [
                    Point2::new(min.x, min.y),
                    Point2::new(max.x, min.y),
                    Point2::new(max.x, max.y),
                    Point2::new(min.x, max.y),
                ];
                for i in 0..4 {
                    out.push(segment_box(corners[i], corners[(i + 1) % 4], thickness).translated(offset));
                }
            }
            Self::EdgeLoopPath { points } => {
                if points.len() < 2 {
                    return;
                }
                for i in 0..points.len() {
                    let next = points[(i + 1) % points.len()];
                    out.push(segment_box(points[i], next, thickness).translated(offset));
                }
            }
            Self::EdgeChain { points } => {
                for pair in points.windows(2) {
                    out.push(segment_box(pair[0], pair[1], thickness).translated(offset));
                }
            }
            Self::Compound { parts } => {
                for part in parts {
                    part.collision_boxes(position, thickness, out);
                }
            }
        }
    }
}

/// A thin box around a segment, padded by half the edge thickness.
fn segment_box(a: Point2<f64>, b: Point2<f64>, thickness: f64) -> Aabb {
    Aabb::from_points(&[a, b]).expanded(thickness * 0.5)
}

/// Shoelace area of a polygon; degenerate inputs yield zero.
fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        doubled += p.x * q.y - q.x * p.y;
    }
    (doubled * 0.5).abs()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_area_and_bounds() {
        let shape = Shape::rectangle(Vector2::new(4.0, 2.0));
        assert_relative_eq!(shape.area(), 8.0, epsilon = 1e-12);
        let bounds = shape.local_bounds();
        assert_eq!(bounds.min, Point2::new(-2.0, -1.0));
        assert_eq!(bounds.max, Point2::new(2.0, 1.0));
    }

    #[test]
    fn test_offset_variants_shift_bounds() {
        let shape = Shape::CircleOffset {
            radius: 1.0,
            center: Vector2::new(5.0, 0.0),
        };
        assert_relative_eq!(shape.area(), std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(shape.local_bounds().center(), Point2::new(5.0, 0.0));
    }

    #[test]
    fn test_edge_shapes_have_zero_area() {
        let loop_shape = Shape::edge_loop(Aabb::from_center(
            Point2::origin(),
            Vector2::new(10.0, 10.0),
        ));
        let chain = Shape::EdgeChain {
            points: vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
        };
        assert_eq!(loop_shape.area(), 0.0);
        assert_eq!(chain.area(), 0.0);
        assert!(loop_shape.is_edge());
        assert!(chain.is_edge());
    }

    #[test]
    fn test_polygon_area_shoelace() {
        // Right triangle with legs 3 and 4
        let shape = Shape::polygon(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 4.0),
        ]);
        assert_relative_eq!(shape.area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_polygon_is_zero() {
        let shape = Shape::polygon(vec![Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)]);
        assert_eq!(shape.area(), 0.0);
        // Bounds still cover the points
        assert!(shape.local_bounds().contains(&Point2::new(1.5, 1.5)));

        let empty = Shape::polygon(Vec::new());
        assert_eq!(empty.area(), 0.0);
        assert_eq!(empty.local_bounds(), Aabb::zero());
    }

    #[test]
    fn test_compound_sums_and_unions() {
        let shape = Shape::compound(vec![
            Shape::rectangle(Vector2::new(2.0, 2.0)),
            Shape::CircleOffset {
                radius: 1.0,
                center: Vector2::new(4.0, 0.0),
            },
        ]);
        assert_relative_eq!(shape.area(), 4.0 + std::f64::consts::PI, epsilon = 1e-12);
        let bounds = shape.local_bounds();
        assert_eq!(bounds.min, Point2::new(-1.0, -1.0));
        assert_eq!(bounds.max, Point2::new(5.0, 1.0));
    }

    #[test]
    fn test_edge_loop_collision_boxes_are_hollow() {
        let shape = Shape::edge_loop(Aabb::from_center(
            Point2::origin(),
            Vector2::new(50.0, 50.0),
        ));
        let mut boxes = Vec::new();
        shape.collision_boxes(Point2::origin(), 1.0, &mut boxes);
        assert_eq!(boxes.len(), 4);
        // The loop interior is not covered.
        assert!(!boxes.iter().any(|b| b.contains(&Point2::origin())));
        // The border is.
        assert!(boxes.iter().any(|b| b.contains(&Point2::new(0.0, -50.0))));
    }

    #[test]
    fn test_solid_shape_collision_box_tracks_position() {
        let shape = Shape::circle(2.0);
        let mut boxes = Vec::new();
        shape.collision_boxes(Point2::new(10.0, 5.0), 1.0, &mut boxes);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].center(), Point2::new(10.0, 5.0));
    }

    #[test]
    fn test_edge_chain_segments() {
        let shape = Shape::EdgeChain {
            points: vec![
                Point2::new(-10.0, 0.0),
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
            ],
        };
        let mut boxes = Vec::new();
        shape.collision_boxes(Point2::origin(), 0.5, &mut boxes);
        assert_eq!(boxes.len(), 2);
        // Thin in Y
        assert_relative_eq!(boxes[0].extents().y, 0.5, epsilon = 1e-12);
    }
}
