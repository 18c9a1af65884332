//! Field definitions and force laws.

use std::fmt;
use std::sync::Arc;

use nalgebra::{Point2, Vector2};

use crate::flow::FlowMap;
use crate::noise::noise_vector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Directions shorter than this cannot be normalized meaningfully.
const DIRECTION_EPSILON: f64 = 1e-12;

/// Everything a field needs to know about the body it acts on.
///
/// Queries can evaluate fields without a real body by passing a probe
/// context (zero velocity, zero charge, unit mass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldContext {
    /// Body position in world coordinates.
    pub position: Point2<f64>,
    /// Field origin in world coordinates.
    pub origin: Point2<f64>,
    /// Body linear velocity.
    pub velocity: Vector2<f64>,
    /// Body mass.
    pub mass: f64,
    /// Body electric charge.
    pub charge: f64,
    /// The field's animated time, advanced once per step.
    pub elapsed_time: f64,
}

impl FieldContext {
    /// A probe context for sampling fields at a point: zero velocity, zero
    /// charge, unit mass.
    #[must_use]
    pub fn probe(position: Point2<f64>, origin: Point2<f64>, elapsed_time: f64) -> Self {
        Self {
            position,
            origin,
            velocity: Vector2::zeros(),
            mass: 1.0,
            charge: 0.0,
            elapsed_time,
        }
    }

    /// Offset of the body from the field origin.
    #[must_use]
    pub fn offset(&self) -> Vector2<f64> {
        self.position - self.origin
    }
}

/// A caller-supplied force function for custom fields.
///
/// Must be a pure function of its context to preserve determinism: the
/// same context must always yield the same force.
pub type FieldFunction = Arc<dyn Fn(&FieldContext) -> Vector2<f64> + Send + Sync>;

/// The bounded area a field acts within, relative to the field origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Region {
    /// No bound; the field reaches everywhere.
    Infinite,
    /// A disc of the given radius around the origin.
    Circle {
        /// Disc radius.
        radius: f64,
    },
    /// A rectangle centered on the origin.
    Rect {
        /// Half-extents of the rectangle.
        half_extents: Vector2<f64>,
    },
}

impl Region {
    /// Whether an offset from the field origin lies inside the region.
    #[must_use]
    pub fn contains(&self, offset: &Vector2<f64>) -> bool {
        match self {
            Self::Infinite => true,
            Self::Circle { radius } => offset.norm_squared() <= radius * radius,
            Self::Rect { half_extents } => {
                offset.x.abs() <= half_extents.x && offset.y.abs() <= half_extents.y
            }
        }
    }
}

/// The force law a field applies.
#[derive(Clone)]
pub enum FieldKind {
    /// Opposes the body's velocity.
    Drag,
    /// Pushes charged bodies along the line to the field origin
    /// (repulsive for positive strength and charge).
    Electric,
    /// Uniform force along the field's direction.
    LinearGravity,
    /// Pulls bodies toward the field origin.
    RadialGravity,
    /// Velocity-perpendicular force scaled by charge.
    Magnetic,
    /// Deterministic trigonometric noise over position and field time.
    Noise,
    /// Noise scaled by the body's speed.
    Turbulence,
    /// Steers the body toward the field's direction as a target velocity.
    Velocity,
    /// Steers the body toward a velocity sampled from a flow map.
    FlowField(FlowMap),
    /// Tangential force around the field origin.
    Vortex,
    /// Hookean pull toward the field origin.
    Spring,
    /// Caller-supplied pure force function.
    Custom(FieldFunction),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drag => f.write_str("Drag"),
            Self::Electric => f.write_str("Electric"),
            Self::LinearGravity => f.write_str("LinearGravity"),
            Self::RadialGravity => f.write_str("RadialGravity"),
            Self::Magnetic => f.write_str("Magnetic"),
            Self::Noise => f.write_str("Noise"),
            Self::Turbulence => f.write_str("Turbulence"),
            Self::Velocity => f.write_str("Velocity"),
            Self::FlowField(map) => f.debug_tuple("FlowField").field(map).finish(),
            Self::Vortex => f.write_str("Vortex"),
            Self::Spring => f.write_str("Spring"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// A force generator evaluated per body per simulation step.
///
/// A field lives in the host's scene graph; the world enumerates enabled
/// fields each step, advances their [`elapsed_time`](Field::elapsed_time),
/// and sums their forces into each eligible body.
///
/// # Example
///
/// ```
/// use planar_field::{Field, FieldContext};
/// use nalgebra::{Point2, Vector2};
///
/// let field = Field::radial_gravity().with_strength(100.0).with_falloff(1.0);
/// let ctx = FieldContext::probe(Point2::new(10.0, 0.0), Point2::origin(), 0.0);
///
/// let force = field.force_on(&ctx);
/// assert!(force.x < 0.0, "radial gravity pulls toward the origin");
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    /// The force law.
    pub kind: FieldKind,
    /// Disabled fields contribute nothing.
    pub is_enabled: bool,
    /// A non-zero force from an exclusive field suppresses every other
    /// field acting on that body that step.
    pub is_exclusive: bool,
    /// Bounded area of effect around the field origin.
    pub region: Region,
    /// Distances below this do not increase the falloff decay.
    pub minimum_radius: f64,
    /// Bodies are affected only if this intersects their field mask.
    pub category_bit_mask: u32,
    /// Force scale.
    pub strength: f64,
    /// Exponent of the distance decay; `0.0` disables decay.
    pub falloff: f64,
    /// Rate at which `elapsed_time` advances per simulated second.
    pub animation_speed: f64,
    /// Octave attenuation for the noise-like kinds, in `[0, 1]`.
    pub smoothness: f64,
    /// Direction for the linear-gravity and velocity kinds.
    pub direction: Vector2<f64>,
    elapsed_time: f64,
}

impl Field {
    fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            is_enabled: true,
            is_exclusive: false,
            region: Region::Infinite,
            minimum_radius: 0.0,
            category_bit_mask: u32::MAX,
            strength: 1.0,
            falloff: 0.0,
            animation_speed: 1.0,
            smoothness: 1.0,
            direction: Vector2::zeros(),
            elapsed_time: 0.0,
        }
    }

    /// A field opposing body velocity.
    #[must_use]
    pub fn drag() -> Self {
        Self::new(FieldKind::Drag)
    }

    /// An electric field acting on charged bodies.
    #[must_use]
    pub fn electric() -> Self {
        Self::new(FieldKind::Electric)
    }

    /// A uniform directional force.
    #[must_use]
    pub fn linear_gravity(direction: Vector2<f64>) -> Self {
        Self::new(FieldKind::LinearGravity).with_direction(direction)
    }

    /// A field pulling bodies toward its origin.
    #[must_use]
    pub fn radial_gravity() -> Self {
        Self::new(FieldKind::RadialGravity)
    }

    /// A magnetic field deflecting charged, moving bodies.
    #[must_use]
    pub fn magnetic() -> Self {
        Self::new(FieldKind::Magnetic)
    }

    /// A deterministic noise field.
    #[must_use]
    pub fn noise(smoothness: f64, animation_speed: f64) -> Self {
        let mut field = Self::new(FieldKind::Noise);
        field.smoothness = smoothness.clamp(0.0, 1.0);
        field.animation_speed = animation_speed;
        field
    }

    /// A noise field whose force grows with body speed.
    #[must_use]
    pub fn turbulence(smoothness: f64, animation_speed: f64) -> Self {
        let mut field = Self::new(FieldKind::Turbulence);
        field.smoothness = smoothness.clamp(0.0, 1.0);
        field.animation_speed = animation_speed;
        field
    }

    /// A field steering bodies toward a target velocity.
    #[must_use]
    pub fn velocity(target: Vector2<f64>) -> Self {
        let mut field = Self::new(FieldKind::Velocity);
        field.direction = target;
        field
    }

    /// A field steering bodies toward velocities sampled from a flow map.
    #[must_use]
    pub fn flow_field(map: FlowMap) -> Self {
        Self::new(FieldKind::FlowField(map))
    }

    /// A tangential force around the field origin.
    #[must_use]
    pub fn vortex() -> Self {
        Self::new(FieldKind::Vortex)
    }

    /// A Hookean spring anchored at the field origin.
    #[must_use]
    pub fn spring() -> Self {
        Self::new(FieldKind::Spring)
    }

    /// A field delegating to a caller-supplied pure function.
    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&FieldContext) -> Vector2<f64> + Send + Sync + 'static,
    {
        Self::new(FieldKind::Custom(Arc::new(function)))
    }

    /// Set the force scale.
    #[must_use]
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Set the distance-decay exponent.
    #[must_use]
    pub fn with_falloff(mut self, falloff: f64) -> Self {
        self.falloff = falloff;
        self
    }

    /// Set the bounded area of effect.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set the radius inside which falloff does not decay.
    #[must_use]
    pub fn with_minimum_radius(mut self, minimum_radius: f64) -> Self {
        self.minimum_radius = minimum_radius.max(0.0);
        self
    }

    /// Set the category mask matched against body field masks.
    #[must_use]
    pub fn with_category_bit_mask(mut self, mask: u32) -> Self {
        self.category_bit_mask = mask;
        self
    }

    /// Set the direction (normalized if possible).
    #[must_use]
    pub fn with_direction(mut self, direction: Vector2<f64>) -> Self {
        let norm = direction.norm();
        self.direction = if norm > DIRECTION_EPSILON {
            direction / norm
        } else {
            direction
        };
        self
    }

    /// Mark the field exclusive.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.is_exclusive = true;
        self
    }

    /// The field's animated time.
    #[must_use]
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Advance the field's animated time by one step.
    pub fn advance(&mut self, dt: f64) {
        self.elapsed_time += self.animation_speed * dt;
    }

    /// The distance-decay multiplier at a given distance from the origin.
    ///
    /// `falloff == 0` means no decay; otherwise
    /// `1 / (1 + max(0, distance - minimum_radius))^falloff`.
    #[must_use]
    pub fn falloff_factor(&self, distance: f64) -> f64 {
        if self.falloff == 0.0 {
            1.0
        } else {
            let reach = (distance - self.minimum_radius).max(0.0);
            (1.0 + reach).powf(self.falloff).recip()
        }
    }

    /// Evaluate the force this field applies to a body.
    ///
    /// Returns zero when the field is disabled or the body lies outside
    /// the field's region. The category/field bitmask check is the
    /// caller's responsibility, since the field does not know the body.
    #[must_use]
    pub fn force_on(&self, ctx: &FieldContext) -> Vector2<f64> {
        if !self.is_enabled {
            return Vector2::zeros();
        }
        let offset = ctx.offset();
        if !self.region.contains(&offset) {
            return Vector2::zeros();
        }

        let distance = offset.norm();
        let decay = self.falloff_factor(distance);
        let scale = self.strength * decay;

        match &self.kind {
            FieldKind::Drag => -ctx.velocity * scale,
            FieldKind::Electric => {
                if distance <= DIRECTION_EPSILON {
                    return Vector2::zeros();
                }
                (offset / distance) * (scale * ctx.charge)
            }
            FieldKind::LinearGravity => self.direction * scale,
            FieldKind::RadialGravity => {
                if distance <= DIRECTION_EPSILON {
                    return Vector2::zeros();
                }
                -(offset / distance) * scale
            }
            FieldKind::Magnetic => {
                let perpendicular = Vector2::new(-ctx.velocity.y, ctx.velocity.x);
                perpendicular * (scale * ctx.charge)
            }
            FieldKind::Noise => {
                noise_vector(ctx.position, ctx.elapsed_time, self.smoothness) * scale
            }
            FieldKind::Turbulence => {
                noise_vector(ctx.position, ctx.elapsed_time, self.smoothness)
                    * (scale * ctx.velocity.norm())
            }
            FieldKind::Velocity => (self.direction - ctx.velocity) * scale,
            FieldKind::FlowField(map) => {
                let target = self.sample_flow(map, &offset);
                (target - ctx.velocity) * scale
            }
            FieldKind::Vortex => Vector2::new(-offset.y, offset.x) * scale,
            FieldKind::Spring => -offset * scale,
            FieldKind::Custom(function) => function.as_ref()(ctx) * scale,
        }
    }

    /// Map an offset from the field origin into flow-map coordinates.
    ///
    /// A rectangular region stretches the map over the region; any other
    /// region maps one grid cell per world unit, centered on the origin.
    fn sample_flow(&self, map: &FlowMap, offset: &Vector2<f64>) -> Vector2<f64> {
        let half = match self.region {
            Region::Rect { half_extents } => half_extents,
            Region::Circle { radius } => Vector2::new(radius, radius),
            Region::Infinite => Vector2::new(map.width() as f64 * 0.5, map.height() as f64 * 0.5),
        };
        if half.x <= 0.0 || half.y <= 0.0 {
            return Vector2::zeros();
        }
        let u = (offset.x + half.x) / (2.0 * half.x);
        let v = (offset.y + half.y) / (2.0 * half.y);
        map.sample(u, v)
    }
}
