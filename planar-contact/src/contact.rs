//! Contact event records and pair identity.

use nalgebra::{Point2, Vector2};
use planar_types::BodyId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable record of a collision event between two bodies.
///
/// Contacts are created fresh every step and never mutated after
/// construction; a "begin" contact and its later "end" contact are
/// different value instances. Only the [`ContactPair`] identity persists
/// across steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    /// First body of the pair.
    pub body_a: BodyId,
    /// Second body of the pair.
    pub body_b: BodyId,
    /// Contact point in world coordinates (midpoint of the overlap region).
    pub point: Point2<f64>,
    /// Contact normal, pointing from body A toward body B.
    pub normal: Vector2<f64>,
    /// Penetration depth along the normal.
    pub penetration: f64,
    /// Magnitude of the impulse applied to separate the bodies.
    ///
    /// Zero for "end" contacts and for pairs that only notify.
    pub impulse: f64,
}

impl Contact {
    /// Create a new contact record with zero impulse.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        point: Point2<f64>,
        normal: Vector2<f64>,
        penetration: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            normal,
            penetration,
            impulse: 0.0,
        }
    }

    /// Attach the resolved impulse magnitude.
    #[must_use]
    pub fn with_impulse(mut self, impulse: f64) -> Self {
        self.impulse = impulse;
        self
    }

    /// The order-independent pair key of this contact.
    #[must_use]
    pub fn pair(&self) -> ContactPair {
        ContactPair::new(self.body_a, self.body_b)
    }
}

/// An order-independent key identifying a contacting pair of bodies.
///
/// `(A, B)` and `(B, A)` produce the same key, so a pair is recognized as
/// the same contact across steps regardless of evaluation order.
///
/// # Example
///
/// ```
/// use planar_contact::ContactPair;
/// use planar_types::BodyId;
///
/// let ab = ContactPair::new(BodyId::new(1), BodyId::new(2));
/// let ba = ContactPair::new(BodyId::new(2), BodyId::new(1));
/// assert_eq!(ab, ba);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPair {
    lo: BodyId,
    hi: BodyId,
}

impl ContactPair {
    /// Create a pair key; argument order is irrelevant.
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The lower body ID of the pair.
    #[must_use]
    pub fn first(&self) -> BodyId {
        self.lo
    }

    /// The higher body ID of the pair.
    #[must_use]
    pub fn second(&self) -> BodyId {
        self.hi
    }

    /// Whether the pair involves the given body.
    #[must_use]
    pub fn involves(&self, id: BodyId) -> bool {
        self.lo == id || self.hi == id
    }

    /// The other body of the pair, if the given body is part of it.
    #[must_use]
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.lo == id {
            Some(self.hi)
        } else if self.hi == id {
            Some(self.lo)
        } else {
            None
        }
    }
}
