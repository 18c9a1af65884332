//! Spatial queries: point, rectangle, and ray lookups plus field sampling.
//!
//! Queries run against each body's cached bounding box, so they work
//! between steps and from within contact callbacks without host access.
//! A body whose box contains a ray's origin is not reported by the ray
//! queries.

use nalgebra::{Point2, Vector2};
use planar_field::FieldContext;
use planar_types::{Aabb, BodyId};

use crate::body::Body;
use crate::raycast::{ray_aabb, RaycastHit};
use crate::scene::SceneHost;
use crate::world::World;

impl World {
    /// The first body whose bounding box contains the point.
    #[must_use]
    pub fn body_at(&self, point: Point2<f64>) -> Option<&Body> {
        self.bodies().find(|body| body.bounding_box().contains(&point))
    }

    /// All bodies whose bounding boxes contain the point.
    #[must_use]
    pub fn bodies_at(&self, point: Point2<f64>) -> Vec<&Body> {
        self.bodies()
            .filter(|body| body.bounding_box().contains(&point))
            .collect()
    }

    /// The first body whose bounding box intersects the rectangle.
    #[must_use]
    pub fn body_in(&self, rect: Aabb) -> Option<&Body> {
        self.bodies().find(|body| body.bounding_box().overlaps(&rect))
    }

    /// All bodies whose bounding boxes intersect the rectangle.
    #[must_use]
    pub fn bodies_in(&self, rect: Aabb) -> Vec<&Body> {
        self.bodies()
            .filter(|body| body.bounding_box().overlaps(&rect))
            .collect()
    }

    /// The first body hit walking the ray in attachment order.
    ///
    /// Use [`raycast`](World::raycast) for the nearest hit.
    #[must_use]
    pub fn body_along_ray(&self, from: Point2<f64>, to: Point2<f64>) -> Option<&Body> {
        let direction = to - from;
        self.bodies()
            .find(|body| ray_aabb(from, direction, &body.bounding_box()).is_some())
    }

    /// Visit bodies containing the point; set the out-parameter to stop.
    pub fn enumerate_bodies_at<F>(&self, point: Point2<f64>, mut visit: F)
    where
        F: FnMut(&Body, &mut bool),
    {
        let mut stop = false;
        for body in self.bodies() {
            if body.bounding_box().contains(&point) {
                visit(body, &mut stop);
                if stop {
                    return;
                }
            }
        }
    }

    /// Visit bodies intersecting the rectangle; set the out-parameter to
    /// stop.
    pub fn enumerate_bodies_in<F>(&self, rect: Aabb, mut visit: F)
    where
        F: FnMut(&Body, &mut bool),
    {
        let mut stop = false;
        for body in self.bodies() {
            if body.bounding_box().overlaps(&rect) {
                visit(body, &mut stop);
                if stop {
                    return;
                }
            }
        }
    }

    /// Visit bodies crossed by the ray; set the out-parameter to stop.
    pub fn enumerate_bodies_along_ray<F>(&self, from: Point2<f64>, to: Point2<f64>, mut visit: F)
    where
        F: FnMut(&Body, &mut bool),
    {
        let direction = to - from;
        let mut stop = false;
        for body in self.bodies() {
            if ray_aabb(from, direction, &body.bounding_box()).is_some() {
                visit(body, &mut stop);
                if stop {
                    return;
                }
            }
        }
    }

    /// The nearest body hit by the segment from `from` to `to`.
    #[must_use]
    pub fn raycast(&self, from: Point2<f64>, to: Point2<f64>) -> Option<RaycastHit> {
        let direction = to - from;
        let length = direction.norm();
        let mut best: Option<RaycastHit> = None;
        for body in self.bodies() {
            if let Some(hit) = ray_aabb(from, direction, &body.bounding_box()) {
                if hit.t > 1.0 {
                    continue;
                }
                let distance = hit.t * length;
                if best.as_ref().map_or(true, |b| distance < b.distance) {
                    best = Some(RaycastHit {
                        body: body.id(),
                        point: from + direction * hit.t,
                        normal: hit.normal,
                        distance,
                    });
                }
            }
        }
        best
    }

    /// Every body hit by the segment, sorted by non-decreasing distance.
    #[must_use]
    pub fn raycast_all(&self, from: Point2<f64>, to: Point2<f64>) -> Vec<RaycastHit> {
        let direction = to - from;
        let length = direction.norm();
        let mut hits: Vec<RaycastHit> = self
            .bodies()
            .filter_map(|body| {
                let hit = ray_aabb(from, direction, &body.bounding_box())?;
                if hit.t > 1.0 {
                    return None;
                }
                Some(RaycastHit {
                    body: body.id(),
                    point: from + direction * hit.t,
                    normal: hit.normal,
                    distance: hit.t * length,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// The combined field force at a point, probed with a zero-velocity,
    /// zero-charge, unit-mass test particle.
    ///
    /// Field animation clocks are not advanced. The exclusive
    /// short-circuit applies exactly as it does for real bodies.
    #[must_use]
    pub fn sample_fields(&self, host: &mut dyn SceneHost, point: Point2<f64>) -> Vector2<f64> {
        let mut total = Vector2::zeros();
        let mut exclusive_won = false;
        host.visit_fields(&mut |field, origin| {
            if exclusive_won || !field.is_enabled {
                return;
            }
            let ctx = FieldContext::probe(point, origin, field.elapsed_time());
            let force = field.force_on(&ctx);
            if field.is_exclusive && force.norm_squared() > 0.0 {
                total = force;
                exclusive_won = true;
            } else {
                total += force;
            }
        });
        total
    }

    /// IDs of all bodies currently contacting the given body.
    #[must_use]
    pub fn contacts_of(&self, id: BodyId) -> Vec<BodyId> {
        self.body(id)
            .map(|body| body.contacted_bodies().collect())
            .unwrap_or_default()
    }
}
