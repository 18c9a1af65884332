//! Rigid bodies.

use hashbrown::HashSet;
use nalgebra::{Point2, Vector2};
use planar_types::{Aabb, BodyId, JointId, NodeId};

use crate::shape::Shape;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Density assigned to volume-based bodies at construction.
pub const DEFAULT_DENSITY: f64 = 1.0;

/// A rigid body wrapping a [`Shape`] with mass, velocity, and collision
/// filtering.
///
/// Bodies are created freely and have no effect until attached to a
/// [`World`](crate::World), which assigns their [`BodyId`] and links them
/// to the host node that owns their transform. The shape is immutable
/// after construction; everything else is mutable.
///
/// # Mass and Density
///
/// `mass` and `density` are kept consistent through the shape's fixed
/// area: setting one updates the other. Edge shapes have zero area and
/// zero mass; they are static by default.
///
/// # Example
///
/// ```
/// use planar_core::Body;
///
/// let mut body = Body::circle(10.0);
/// assert!(body.is_dynamic);
///
/// body.set_mass(5.0);
/// let area = body.area();
/// assert!((body.density() - 5.0 / area).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) node: Option<NodeId>,
    name: Option<String>,
    shape: Shape,
    center: Vector2<f64>,
    mass: f64,
    density: f64,

    /// Whether the body is moved by the simulation.
    pub is_dynamic: bool,
    /// Whether world gravity applies to this body.
    pub affected_by_gravity: bool,
    /// Whether torques and collisions may rotate this body.
    pub allows_rotation: bool,
    /// Surface friction coefficient.
    pub friction: f64,
    /// Bounciness, 0 (inelastic) to 1 (elastic).
    pub restitution: f64,
    /// Linear velocity decay per second.
    pub linear_damping: f64,
    /// Angular velocity decay per second.
    pub angular_damping: f64,
    /// Linear velocity.
    pub velocity: Vector2<f64>,
    /// Angular velocity in rad/s.
    pub angular_velocity: f64,
    /// What this body "is" to other bodies' masks.
    pub category_bit_mask: u32,
    /// Categories this body physically collides with.
    pub collision_bit_mask: u32,
    /// Categories whose contacts trigger delegate notification.
    pub contact_test_bit_mask: u32,
    /// Field categories that may act on this body.
    pub field_bit_mask: u32,
    /// Electric charge, read by electric and magnetic fields.
    pub charge: f64,
    /// Pinned bodies never translate but may still rotate.
    pub pinned: bool,
    /// Swept (continuous) collision detection for fast movers.
    pub uses_precise_collision_detection: bool,

    pub(crate) is_resting: bool,
    pub(crate) resting_time: f64,
    pub(crate) position: Point2<f64>,
    pub(crate) rotation: f64,
    pub(crate) previous_position: Point2<f64>,
    pub(crate) joints: Vec<JointId>,
    pub(crate) contacted: HashSet<BodyId>,
}

impl Body {
    fn with_shape(shape: Shape) -> Self {
        let area = shape.area();
        let is_edge = shape.is_edge();
        let (mass, density) = if area > 0.0 {
            (DEFAULT_DENSITY * area, DEFAULT_DENSITY)
        } else {
            (0.0, 0.0)
        };
        Self {
            id: BodyId::new(0),
            node: None,
            name: None,
            shape,
            center: Vector2::zeros(),
            mass,
            density,
            is_dynamic: !is_edge,
            affected_by_gravity: !is_edge,
            allows_rotation: true,
            friction: 0.2,
            restitution: 0.2,
            linear_damping: 0.1,
            angular_damping: 0.1,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            category_bit_mask: u32::MAX,
            collision_bit_mask: u32::MAX,
            contact_test_bit_mask: 0,
            field_bit_mask: u32::MAX,
            charge: 0.0,
            pinned: false,
            uses_precise_collision_detection: false,
            is_resting: false,
            resting_time: 0.0,
            position: Point2::origin(),
            rotation: 0.0,
            previous_position: Point2::origin(),
            joints: Vec::new(),
            contacted: HashSet::new(),
        }
    }

    /// A dynamic rectangular body.
    #[must_use]
    pub fn rectangle(size: Vector2<f64>) -> Self {
        Self::with_shape(Shape::Rectangle { size })
    }

    /// A dynamic rectangular body centered on an offset.
    #[must_use]
    pub fn rectangle_with_center(size: Vector2<f64>, center: Vector2<f64>) -> Self {
        Self::with_shape(Shape::RectangleOffset { size, center })
    }

    /// A dynamic circular body.
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self::with_shape(Shape::Circle { radius })
    }

    /// A dynamic circular body centered on an offset.
    #[must_use]
    pub fn circle_with_center(radius: f64, center: Vector2<f64>) -> Self {
        Self::with_shape(Shape::CircleOffset { radius, center })
    }

    /// A static border around a rectangle.
    #[must_use]
    pub fn edge_loop(rect: Aabb) -> Self {
        Self::with_shape(Shape::EdgeLoop { rect })
    }

    /// A static closed polyline border.
    #[must_use]
    pub fn edge_loop_path(points: Vec<Point2<f64>>) -> Self {
        Self::with_shape(Shape::EdgeLoopPath { points })
    }

    /// A static open polyline border.
    #[must_use]
    pub fn edge_chain(points: Vec<Point2<f64>>) -> Self {
        Self::with_shape(Shape::EdgeChain { points })
    }

    /// A dynamic convex polygon body.
    #[must_use]
    pub fn polygon(points: Vec<Point2<f64>>) -> Self {
        Self::with_shape(Shape::Polygon { points })
    }

    /// A body combining several sub-bodies into one.
    ///
    /// The compound's mass is the sum of the sub-bodies' masses; its shape
    /// is the union of their shapes.
    #[must_use]
    pub fn compound(bodies: Vec<Body>) -> Self {
        let mass: f64 = bodies.iter().map(Body::mass).sum();
        let parts: Vec<Shape> = bodies.into_iter().map(|b| b.shape).collect();
        let mut body = Self::with_shape(Shape::Compound { parts });
        if mass > 0.0 {
            body.set_mass(mass);
        }
        body
    }

    /// Set a debugging name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the center-of-mass offset in body-local coordinates.
    #[must_use]
    pub fn with_center(mut self, center: Vector2<f64>) -> Self {
        self.center = center;
        self
    }

    /// The identifier assigned when the body was attached to a world.
    #[must_use]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// The host node owning this body's transform, if attached.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// The debugging name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The body's shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The center-of-mass offset in body-local coordinates.
    #[must_use]
    pub fn center(&self) -> Vector2<f64> {
        self.center
    }

    /// The enclosed area of the body's shape.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.shape.area()
    }

    /// The body's mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the mass, updating density through the fixed shape area.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(0.0);
        let area = self.area();
        self.density = if area > 0.0 { self.mass / area } else { 0.0 };
    }

    /// The body's density.
    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Set the density, updating mass through the fixed shape area.
    pub fn set_density(&mut self, density: f64) {
        self.density = density.max(0.0);
        self.mass = self.density * self.area();
    }

    /// Approximate moment of inertia: `mass * area / 12`.
    #[must_use]
    pub fn moment_of_inertia(&self) -> f64 {
        self.mass * self.area() / 12.0
    }

    /// Cached world position, synced from the host each step.
    #[must_use]
    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Cached world rotation, synced from the host each step.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Whether the body has been put to rest by the simulation.
    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.is_resting
    }

    /// Joints this body participates in.
    #[must_use]
    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }

    /// Bodies currently in contact with this one.
    pub fn contacted_bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.contacted.iter().copied()
    }

    /// The body's bounding box at a given world position.
    ///
    /// Compound shapes union all sub-shape boxes. Rotation does not affect
    /// the box; collision is axis-aligned throughout.
    #[must_use]
    pub fn bounding_box_at(&self, position: Point2<f64>) -> Aabb {
        self.shape.local_bounds().translated(position.coords)
    }

    /// The body's bounding box at its cached world position.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box_at(self.position)
    }

    /// Append the body's collision boxes at its cached position.
    pub(crate) fn collision_boxes(&self, thickness: f64, out: &mut Vec<Aabb>) {
        self.shape.collision_boxes(self.position, thickness, out);
    }

    /// The body's center of mass in world coordinates.
    #[must_use]
    pub fn world_center(&self) -> Point2<f64> {
        self.position + self.center
    }

    /// Inverse mass as the contact solver sees it: zero when the body
    /// cannot translate.
    #[must_use]
    pub fn effective_inv_mass(&self) -> f64 {
        if self.is_dynamic && !self.pinned && self.mass > 0.0 {
            self.mass.recip()
        } else {
            0.0
        }
    }

    /// Inverse moment of inertia: zero when the body cannot rotate.
    #[must_use]
    pub fn effective_inv_inertia(&self) -> f64 {
        let moment = self.moment_of_inertia();
        if self.is_dynamic && self.allows_rotation && moment > 0.0 {
            moment.recip()
        } else {
            0.0
        }
    }

    /// Whether contact resolution may move this body.
    #[must_use]
    pub fn is_movable(&self) -> bool {
        self.is_dynamic && !self.pinned
    }

    /// Apply a force through the center of mass.
    ///
    /// No-op for static, pinned, or massless bodies.
    pub fn apply_force(&mut self, force: Vector2<f64>) {
        if !self.is_dynamic || self.pinned || self.mass <= 0.0 {
            return;
        }
        self.velocity += force / self.mass;
        if force.norm_squared() > 0.0 {
            self.wake_up();
        }
    }

    /// Apply a force at a world-space point.
    ///
    /// The off-center component becomes torque through the 2D cross
    /// product of the lever arm and the force.
    pub fn apply_force_at(&mut self, force: Vector2<f64>, point: Point2<f64>) {
        let lever = point - self.world_center();
        self.apply_force(force);
        self.apply_torque(cross(lever, force));
    }

    /// Apply a torque.
    ///
    /// No-op unless the body is dynamic, allows rotation, and has a
    /// positive moment of inertia. Pinned bodies may still rotate.
    pub fn apply_torque(&mut self, torque: f64) {
        if !self.is_dynamic || !self.allows_rotation {
            return;
        }
        let moment = self.moment_of_inertia();
        if moment <= 0.0 {
            return;
        }
        self.angular_velocity += torque / moment;
        if torque != 0.0 {
            self.wake_up();
        }
    }

    /// Apply an instantaneous impulse through the center of mass.
    pub fn apply_impulse(&mut self, impulse: Vector2<f64>) {
        self.apply_force(impulse);
    }

    /// Apply an instantaneous impulse at a world-space point.
    pub fn apply_impulse_at(&mut self, impulse: Vector2<f64>, point: Point2<f64>) {
        self.apply_force_at(impulse, point);
    }

    /// Apply an instantaneous angular impulse.
    pub fn apply_angular_impulse(&mut self, impulse: f64) {
        self.apply_torque(impulse);
    }

    /// Clear the resting state and timer.
    pub fn wake_up(&mut self) {
        self.is_resting = false;
        self.resting_time = 0.0;
    }

    /// Force the resting state. Resting a body zeroes its velocities.
    pub fn set_resting(&mut self, resting: bool) {
        if resting {
            self.rest();
        } else {
            self.wake_up();
        }
    }

    /// Put the body to rest, zeroing its velocities.
    pub(crate) fn rest(&mut self) {
        self.is_resting = true;
        self.velocity = Vector2::zeros();
        self.angular_velocity = 0.0;
    }

    /// Whether a pair needs collision testing at all: at least one body is
    /// dynamic and some mask pair intersects.
    #[must_use]
    pub fn should_test(a: &Body, b: &Body) -> bool {
        (a.is_dynamic || b.is_dynamic)
            && (Self::should_collide(a, b) || Self::should_notify(a, b))
    }

    /// Whether a pair physically collides (separation and impulses).
    #[must_use]
    pub fn should_collide(a: &Body, b: &Body) -> bool {
        (a.collision_bit_mask & b.category_bit_mask) != 0
            || (b.collision_bit_mask & a.category_bit_mask) != 0
    }

    /// Whether a pair's contacts notify the delegate.
    #[must_use]
    pub fn should_notify(a: &Body, b: &Body) -> bool {
        (a.contact_test_bit_mask & b.category_bit_mask) != 0
            || (b.contact_test_bit_mask & a.category_bit_mask) != 0
    }
}

/// 2D cross product (z component of the 3D cross product).
#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}
