//! The simulation world: body and joint management plus the step pipeline.

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point2, Vector2};

use planar_constraint::{BodyState, ConstraintSolver, ConstraintSolverConfig, Joint};
use planar_contact::{
    aabb_manifold, resolve_impulse, split_penetration, Contact, ContactBody, ContactPair,
    ImpulseResult, Manifold,
};
use planar_field::{Field, FieldContext};
use planar_types::{Aabb, BodyId, JointId, NodeId, PhysicsError, Transform2, Velocity2, WorldConfig};

use crate::body::Body;
use crate::raycast::{ray_aabb, RayBoxHit};
use crate::scene::{ContactDelegate, SceneHost};

/// Movements shorter than this skip the CCD sweep entirely.
const CCD_MIN_DISTANCE_SQUARED: f64 = 1e-12;

/// The authoritative container of bodies and joints, stepped once per
/// fixed timestep.
///
/// The world owns its bodies and joints; bodies refer back to their host
/// node and to each other by identifier only. One [`simulate`](World::simulate)
/// call runs the whole pipeline: host sync, field gathering, integration,
/// joint constraints, CCD, narrow-phase collision, contact diffing, and
/// delegate notification.
///
/// # Example
///
/// ```
/// use planar_core::{Body, SimpleScene, World};
/// use planar_types::{Transform2, WorldConfig};
/// use nalgebra::Point2;
///
/// let mut scene = SimpleScene::new();
/// let mut world = World::new(WorldConfig::default());
///
/// let node = scene.add_node(Transform2::from_position(Point2::new(0.0, 100.0)));
/// let id = world.add_body(Body::circle(1.0), node, Transform2::from_position(Point2::new(0.0, 100.0)));
///
/// for _ in 0..60 {
///     world.simulate(1.0 / 60.0, &mut scene);
/// }
///
/// // Gravity pulled the body down.
/// assert!(world.body(id).unwrap().position().y < 100.0);
/// ```
pub struct World {
    config: WorldConfig,
    bodies: HashMap<BodyId, Body>,
    body_order: Vec<BodyId>,
    joints: HashMap<JointId, Joint>,
    joint_order: Vec<JointId>,
    next_body_id: u64,
    next_joint_id: u64,
    previous_contacts: HashSet<ContactPair>,
    current_contacts: HashSet<ContactPair>,
    contact_map: HashMap<ContactPair, Contact>,
    solver: ConstraintSolver,
    delegate: Option<Box<dyn ContactDelegate>>,
    /// Bodies without a live host transform this step.
    inert: HashSet<BodyId>,
    time: f64,
    step_count: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Create a world with the given configuration.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: HashMap::new(),
            body_order: Vec::new(),
            joints: HashMap::new(),
            joint_order: Vec::new(),
            next_body_id: 0,
            next_joint_id: 0,
            previous_contacts: HashSet::new(),
            current_contacts: HashSet::new(),
            contact_map: HashMap::new(),
            solver: ConstraintSolver::default(),
            delegate: None,
            inert: HashSet::new(),
            time: 0.0,
            step_count: 0,
        }
    }

    /// The world configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Gravitational acceleration.
    #[must_use]
    pub fn gravity(&self) -> Vector2<f64> {
        self.config.gravity
    }

    /// Set the gravitational acceleration.
    pub fn set_gravity(&mut self, gravity: Vector2<f64>) {
        self.config.gravity = gravity;
    }

    /// The simulation speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    /// Set the simulation speed multiplier.
    pub fn set_speed(&mut self, speed: f64) {
        self.config.speed = speed;
    }

    /// Replace the constraint solver configuration.
    pub fn set_constraint_config(&mut self, config: ConstraintSolverConfig) {
        self.solver = ConstraintSolver::new(config);
    }

    /// Install the contact delegate.
    pub fn set_delegate(&mut self, delegate: Box<dyn ContactDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Remove and return the contact delegate.
    pub fn take_delegate(&mut self) -> Option<Box<dyn ContactDelegate>> {
        self.delegate.take()
    }

    /// Accumulated simulated time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed simulation steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Number of attached bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of registered joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // ========================================================================
    // Body management
    // ========================================================================

    /// Attach a body, linking it to its host node.
    ///
    /// Called by the host when the body's owner enters the simulated
    /// world. The transform seeds the body's cached position until the
    /// first step syncs from the host.
    pub fn add_body(&mut self, mut body: Body, node: NodeId, transform: Transform2) -> BodyId {
        self.next_body_id += 1;
        let id = BodyId::new(self.next_body_id);
        body.id = id;
        body.node = Some(node);
        body.position = transform.position;
        body.rotation = transform.rotation;
        body.previous_position = transform.position;
        self.bodies.insert(id, body);
        self.body_order.push(id);
        id
    }

    /// Detach a body.
    ///
    /// Joints registered on the body are removed from the world and from
    /// their other endpoint; contact tracking involving the body is
    /// dropped without firing end events.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let mut body = self.bodies.remove(&id)?;
        self.body_order.retain(|other| *other != id);

        for joint_id in std::mem::take(&mut body.joints) {
            self.remove_joint(joint_id);
        }

        self.previous_contacts.retain(|pair| !pair.involves(id));
        self.current_contacts.retain(|pair| !pair.involves(id));
        self.contact_map.retain(|pair, _| !pair.involves(id));
        for other in self.bodies.values_mut() {
            other.contacted.remove(&id);
        }

        body.node = None;
        Some(body)
    }

    /// A body by ID.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// A body by ID, mutably.
    #[must_use]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// The first body with the given name.
    #[must_use]
    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.body_order
            .iter()
            .filter_map(|id| self.bodies.get(id))
            .find(|body| body.name() == Some(name))
    }

    /// All bodies, in attachment order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.body_order.iter().filter_map(|id| self.bodies.get(id))
    }

    /// All body IDs, in attachment order.
    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.body_order.iter().copied()
    }

    // ========================================================================
    // Joint management
    // ========================================================================

    /// Register a joint, cross-registering it on both endpoint bodies.
    ///
    /// The joint's world-space anchors are bound to body-local offsets
    /// using the bodies' current transforms.
    pub fn add_joint(&mut self, mut joint: Joint) -> planar_types::Result<JointId> {
        let (a_id, b_id) = (joint.body_a, joint.body_b);
        let Some(a) = self.bodies.get(&a_id) else {
            return Err(PhysicsError::JointBodyMissing(a_id.raw()));
        };
        let Some(b) = self.bodies.get(&b_id) else {
            return Err(PhysicsError::JointBodyMissing(b_id.raw()));
        };
        joint.bind(a.position, a.rotation, b.position, b.rotation);

        self.next_joint_id += 1;
        let id = JointId::new(self.next_joint_id);
        joint.id = id;
        self.joints.insert(id, joint);
        self.joint_order.push(id);

        if let Some(a) = self.bodies.get_mut(&a_id) {
            a.joints.push(id);
            a.wake_up();
        }
        if let Some(b) = self.bodies.get_mut(&b_id) {
            b.joints.push(id);
            b.wake_up();
        }
        Ok(id)
    }

    /// Remove a joint, unregistering it from both endpoint bodies.
    pub fn remove_joint(&mut self, id: JointId) -> Option<Joint> {
        let mut joint = self.joints.remove(&id)?;
        self.joint_order.retain(|other| *other != id);
        for body_id in [joint.body_a, joint.body_b] {
            if let Some(body) = self.bodies.get_mut(&body_id) {
                body.joints.retain(|jid| *jid != id);
            }
        }
        joint.unbind();
        Some(joint)
    }

    /// A joint by ID.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(&id)
    }

    /// A joint by ID, mutably.
    #[must_use]
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(&id)
    }

    /// All joints, in registration order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joint_order.iter().filter_map(|id| self.joints.get(id))
    }

    // ========================================================================
    // Simulation step
    // ========================================================================

    /// Advance the simulation by one step.
    ///
    /// `dt` is scaled by the world's speed multiplier; a non-positive or
    /// non-finite scaled value makes the call an idempotent no-op.
    pub fn simulate(&mut self, dt: f64, host: &mut dyn SceneHost) {
        let dt = dt * self.config.speed;
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.current_contacts.clear();
        self.contact_map.clear();

        self.sync_from_host(host);
        self.snapshot_previous_positions();

        let fields = Self::collect_fields(host, dt);
        self.integrate(dt, &fields);
        self.solve_joints(dt);

        // Bounces slower than two frames of free fall are resting noise,
        // not impacts; resolving them inelastically lets bodies settle.
        let restitution_threshold = 2.0 * self.config.gravity.norm() * dt;

        let ccd_resolved = self.ccd_pass(restitution_threshold);
        self.narrow_phase(&ccd_resolved, restitution_threshold);
        self.update_resting(dt);
        self.notify_contacts();

        self.previous_contacts = std::mem::take(&mut self.current_contacts);
        self.sync_to_host(host);

        self.time += dt;
        self.step_count += 1;
    }

    /// Pull transforms from the host; bodies without one are inert.
    fn sync_from_host(&mut self, host: &dyn SceneHost) {
        self.inert.clear();
        for i in 0..self.body_order.len() {
            let id = self.body_order[i];
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };
            match body.node.and_then(|node| host.transform(node)) {
                Some(transform) => {
                    body.position = transform.position;
                    body.rotation = transform.rotation;
                }
                None => {
                    self.inert.insert(id);
                }
            }
        }
    }

    /// Write integrated transforms back to the host.
    fn sync_to_host(&self, host: &mut dyn SceneHost) {
        for body in self.bodies.values() {
            if !body.is_dynamic || self.inert.contains(&body.id) {
                continue;
            }
            if let Some(node) = body.node {
                host.set_transform(
                    node,
                    Transform2::from_position_rotation(body.position, body.rotation),
                );
            }
        }
    }

    /// Snapshot positions of precision-flagged bodies for the CCD sweep.
    fn snapshot_previous_positions(&mut self) {
        for body in self.bodies.values_mut() {
            if body.uses_precise_collision_detection && body.is_dynamic {
                body.previous_position = body.position;
            }
        }
    }

    /// Enumerate enabled fields, advancing their animation clocks.
    fn collect_fields(host: &mut dyn SceneHost, dt: f64) -> Vec<(Field, Point2<f64>)> {
        let mut snapshots = Vec::new();
        host.visit_fields(&mut |field, origin| {
            if field.is_enabled {
                field.advance(dt);
                snapshots.push((field.clone(), origin));
            }
        });
        snapshots
    }

    /// Sum field forces for one body, honoring masks, regions, and the
    /// exclusive short-circuit.
    fn field_force(body: &Body, fields: &[(Field, Point2<f64>)]) -> Vector2<f64> {
        let mut total = Vector2::zeros();
        for (field, origin) in fields {
            if field.category_bit_mask & body.field_bit_mask == 0 {
                continue;
            }
            let ctx = FieldContext {
                position: body.position,
                origin: *origin,
                velocity: body.velocity,
                mass: body.mass(),
                charge: body.charge,
                elapsed_time: field.elapsed_time(),
            };
            let force = field.force_on(&ctx);
            if field.is_exclusive && force.norm_squared() > 0.0 {
                return force;
            }
            total += force;
        }
        total
    }

    /// Integrate velocities and positions of dynamic, un-pinned bodies.
    fn integrate(&mut self, dt: f64, fields: &[(Field, Point2<f64>)]) {
        let gravity = self.config.gravity;
        let max_linear = self.config.max_linear_speed;
        let max_angular = self.config.max_angular_speed;

        for i in 0..self.body_order.len() {
            let id = self.body_order[i];
            if self.inert.contains(&id) {
                continue;
            }
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };
            if !body.is_dynamic || body.pinned || body.is_resting {
                continue;
            }

            let saved_position = body.position;
            let saved_rotation = body.rotation;

            if body.affected_by_gravity {
                body.velocity += gravity * dt;
            }

            let field_force = Self::field_force(body, fields);
            if body.mass() > 0.0 {
                body.velocity += field_force / body.mass();
            }

            body.velocity *= (1.0 - body.linear_damping * dt).max(0.0);
            body.angular_velocity *= (1.0 - body.angular_damping * dt).max(0.0);

            if let Some(limit) = max_linear {
                let speed = body.velocity.norm();
                if speed > limit {
                    body.velocity *= limit / speed;
                }
            }
            if let Some(limit) = max_angular {
                body.angular_velocity = body.angular_velocity.clamp(-limit, limit);
            }

            body.position += body.velocity * dt;
            if body.allows_rotation {
                body.rotation += body.angular_velocity * dt;
            }

            if !body.position.x.is_finite()
                || !body.position.y.is_finite()
                || !body.velocity.x.is_finite()
                || !body.velocity.y.is_finite()
                || !body.rotation.is_finite()
                || !body.angular_velocity.is_finite()
            {
                tracing::warn!("body {} diverged; freezing it for this step", id);
                body.position = saved_position;
                body.rotation = saved_rotation;
                body.velocity = Vector2::zeros();
                body.angular_velocity = 0.0;
            }
        }
    }

    /// The constraint solver's view of a body.
    fn body_state(&self, id: BodyId) -> Option<BodyState> {
        let body = self.bodies.get(&id)?;
        Some(BodyState {
            position: body.position,
            rotation: body.rotation,
            velocity: body.velocity,
            angular_velocity: body.angular_velocity,
            inv_mass: body.effective_inv_mass(),
            inv_inertia: body.effective_inv_inertia(),
        })
    }

    /// Run the penalty constraint pass and record reaction forces.
    fn solve_joints(&mut self, dt: f64) {
        for i in 0..self.joint_order.len() {
            let joint_id = self.joint_order[i];
            let Some(joint) = self.joints.get(&joint_id) else {
                continue;
            };
            let (a_id, b_id) = (joint.body_a, joint.body_b);
            if self.inert.contains(&a_id) || self.inert.contains(&b_id) {
                continue;
            }
            let (Some(state_a), Some(state_b)) = (self.body_state(a_id), self.body_state(b_id))
            else {
                continue;
            };

            let force = self.solver.solve(joint, &state_a, &state_b);

            if let Some(body) = self.bodies.get_mut(&a_id) {
                if body.is_movable() {
                    body.velocity += force.force_a * (state_a.inv_mass * dt);
                }
                if body.allows_rotation {
                    body.angular_velocity += force.torque_a * (state_a.inv_inertia * dt);
                }
                if force.force_a.norm_squared() > 0.0 || force.torque_a != 0.0 {
                    body.wake_up();
                }
            }
            if let Some(body) = self.bodies.get_mut(&b_id) {
                if body.is_movable() {
                    body.velocity += force.force_b * (state_b.inv_mass * dt);
                }
                if body.allows_rotation {
                    body.angular_velocity += force.torque_b * (state_b.inv_inertia * dt);
                }
                if force.force_b.norm_squared() > 0.0 || force.torque_b != 0.0 {
                    body.wake_up();
                }
            }
            if let Some(joint) = self.joints.get_mut(&joint_id) {
                joint.reaction_force = force.force_b;
                joint.reaction_torque = force.torque_b;
            }
        }
    }

    /// Sweep precision-flagged bodies against Minkowski-expanded targets.
    ///
    /// Bodies stopped here bypass the regular narrow phase this step.
    fn ccd_pass(&mut self, restitution_threshold: f64) -> HashSet<BodyId> {
        let order = self.body_order.clone();
        let thickness = self.config.edge_thickness;
        let slop = self.config.ccd_slop;
        let mut resolved = HashSet::new();
        let mut scratch: Vec<Aabb> = Vec::new();

        for &id in &order {
            let Some(mover) = self.bodies.get(&id) else {
                continue;
            };
            if !mover.uses_precise_collision_detection
                || !mover.is_dynamic
                || mover.pinned
                || mover.is_resting
                || self.inert.contains(&id)
            {
                continue;
            }
            let movement = mover.position - mover.previous_position;
            if movement.norm_squared() <= CCD_MIN_DISTANCE_SQUARED {
                continue;
            }
            let start = mover.previous_position;
            let half_extents = mover.shape().half_extents();
            let mover_restitution = mover.restitution;
            let mover_mass = mover.mass();

            let mut best: Option<(RayBoxHit, BodyId, f64)> = None;
            for &other_id in &order {
                if other_id == id || self.inert.contains(&other_id) {
                    continue;
                }
                let (Some(mover), Some(other)) =
                    (self.bodies.get(&id), self.bodies.get(&other_id))
                else {
                    continue;
                };
                if !Body::should_test(mover, other) {
                    continue;
                }
                scratch.clear();
                other.collision_boxes(thickness, &mut scratch);
                for target in &scratch {
                    let expanded = target.expanded_by(half_extents);
                    if let Some(hit) = ray_aabb(start, movement, &expanded) {
                        if hit.t < 1.0
                            && best.as_ref().map_or(true, |(prev, _, _)| hit.t < prev.t)
                        {
                            best = Some((hit, other_id, other.restitution));
                        }
                    }
                }
            }

            let Some((hit, other_id, other_restitution)) = best else {
                continue;
            };

            let stop_point = start + movement * hit.t;
            if let Some(body) = self.bodies.get_mut(&id) {
                body.position = stop_point + hit.normal * slop;
                let normal_speed = body.velocity.dot(&hit.normal);
                let mut impulse = 0.0;
                if normal_speed < 0.0 {
                    let restitution = if -normal_speed > restitution_threshold {
                        mover_restitution.min(other_restitution)
                    } else {
                        0.0
                    };
                    body.velocity -= hit.normal * ((1.0 + restitution) * normal_speed);
                    impulse = normal_speed.abs() * mover_mass;
                }

                let pair = ContactPair::new(id, other_id);
                let contact =
                    Contact::new(id, other_id, stop_point, -hit.normal, 0.0).with_impulse(impulse);
                self.current_contacts.insert(pair);
                self.contact_map.insert(pair, contact);
            }
            resolved.insert(id);
        }
        resolved
    }

    /// Everything the narrow phase decides about one overlapping pair.
    fn evaluate_pair(
        &self,
        a_id: BodyId,
        b_id: BodyId,
        restitution_threshold: f64,
        boxes_a: &mut Vec<Aabb>,
        boxes_b: &mut Vec<Aabb>,
    ) -> Option<PairOutcome> {
        let a = self.bodies.get(&a_id)?;
        let b = self.bodies.get(&b_id)?;
        if !Body::should_test(a, b) {
            return None;
        }

        let thickness = self.config.edge_thickness;
        boxes_a.clear();
        boxes_b.clear();
        a.collision_boxes(thickness, boxes_a);
        b.collision_boxes(thickness, boxes_b);

        let mut best: Option<Manifold> = None;
        for box_a in boxes_a.iter() {
            for box_b in boxes_b.iter() {
                if let Some(manifold) = aabb_manifold(box_a, box_b) {
                    if best.map_or(true, |prev| manifold.penetration > prev.penetration) {
                        best = Some(manifold);
                    }
                }
            }
        }
        let manifold = best?;

        let collides = Body::should_collide(a, b);
        let (resolution, correction_a, correction_b) = if collides {
            let contact_a = ContactBody {
                inv_mass: a.effective_inv_mass(),
                velocity: a.velocity,
                restitution: a.restitution,
                friction: a.friction,
            };
            let contact_b = ContactBody {
                inv_mass: b.effective_inv_mass(),
                velocity: b.velocity,
                restitution: b.restitution,
                friction: b.friction,
            };
            let resolution = resolve_impulse(
                &contact_a,
                &contact_b,
                &manifold.normal,
                restitution_threshold,
            );
            let (da, db) = split_penetration(
                &manifold.normal,
                manifold.penetration,
                a.is_movable(),
                b.is_movable(),
            );
            (resolution, da, db)
        } else {
            (None, Vector2::zeros(), Vector2::zeros())
        };

        Some(PairOutcome {
            manifold,
            collides,
            resolution,
            correction_a,
            correction_b,
        })
    }

    /// Pairwise narrow phase over every combination not handled by CCD.
    fn narrow_phase(&mut self, ccd_resolved: &HashSet<BodyId>, restitution_threshold: f64) {
        let order = self.body_order.clone();
        let wake_threshold = self.config.resting_speed_threshold;
        let mut boxes_a: Vec<Aabb> = Vec::new();
        let mut boxes_b: Vec<Aabb> = Vec::new();

        for i in 0..order.len() {
            let a_id = order[i];
            if self.inert.contains(&a_id) || ccd_resolved.contains(&a_id) {
                continue;
            }
            for j in (i + 1)..order.len() {
                let b_id = order[j];
                if self.inert.contains(&b_id) || ccd_resolved.contains(&b_id) {
                    continue;
                }
                let Some(outcome) = self.evaluate_pair(
                    a_id,
                    b_id,
                    restitution_threshold,
                    &mut boxes_a,
                    &mut boxes_b,
                ) else {
                    continue;
                };

                let pair = ContactPair::new(a_id, b_id);
                self.current_contacts.insert(pair);

                let impulse = outcome.resolution.map_or(0.0, |r| r.normal_impulse);
                let contact = Contact::new(
                    a_id,
                    b_id,
                    outcome.manifold.point,
                    outcome.manifold.normal,
                    outcome.manifold.penetration,
                )
                .with_impulse(impulse);
                self.contact_map
                    .entry(pair)
                    .and_modify(|existing| {
                        if contact.impulse > existing.impulse
                            || (contact.impulse == existing.impulse
                                && contact.penetration > existing.penetration)
                        {
                            *existing = contact;
                        }
                    })
                    .or_insert(contact);

                if !outcome.collides {
                    continue;
                }
                if let Some(body) = self.bodies.get_mut(&a_id) {
                    if let Some(resolution) = outcome.resolution {
                        if body.is_movable() {
                            body.velocity = resolution.velocity_a;
                        }
                        if resolution.normal_impulse * body.effective_inv_mass() > wake_threshold {
                            body.wake_up();
                        }
                    }
                    if body.is_movable() {
                        body.position += outcome.correction_a;
                    }
                }
                if let Some(body) = self.bodies.get_mut(&b_id) {
                    if let Some(resolution) = outcome.resolution {
                        if body.is_movable() {
                            body.velocity = resolution.velocity_b;
                        }
                        if resolution.normal_impulse * body.effective_inv_mass() > wake_threshold {
                            body.wake_up();
                        }
                    }
                    if body.is_movable() {
                        body.position += outcome.correction_b;
                    }
                }
            }
        }
    }

    /// Advance rest timers; slow bodies fall asleep, moving ones wake.
    fn update_resting(&mut self, dt: f64) {
        let threshold = self.config.resting_speed_threshold;
        let delay = self.config.resting_delay;
        for i in 0..self.body_order.len() {
            let id = self.body_order[i];
            if self.inert.contains(&id) {
                continue;
            }
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };
            // Jointed bodies hold a constraint equilibrium that needs the
            // solver running every step; they never rest.
            if !body.is_dynamic || body.pinned || !body.joints.is_empty() {
                continue;
            }
            let velocity = Velocity2::new(body.velocity, body.angular_velocity);
            if velocity.is_below(threshold) {
                body.resting_time += dt;
                if body.resting_time >= delay {
                    body.rest();
                }
            } else {
                body.is_resting = false;
                body.resting_time = 0.0;
            }
        }
    }

    /// Diff contact sets, update contacted-body bookkeeping, and fire the
    /// delegate.
    fn notify_contacts(&mut self) {
        let mut begins: Vec<ContactPair> = self
            .current_contacts
            .difference(&self.previous_contacts)
            .copied()
            .collect();
        let mut ends: Vec<ContactPair> = self
            .previous_contacts
            .difference(&self.current_contacts)
            .copied()
            .collect();
        begins.sort_unstable();
        ends.sort_unstable();

        for pair in &begins {
            let (a, b) = (pair.first(), pair.second());
            if let Some(body) = self.bodies.get_mut(&a) {
                body.contacted.insert(b);
            }
            if let Some(body) = self.bodies.get_mut(&b) {
                body.contacted.insert(a);
            }
        }
        for pair in &ends {
            let (a, b) = (pair.first(), pair.second());
            if let Some(body) = self.bodies.get_mut(&a) {
                body.contacted.remove(&b);
            }
            if let Some(body) = self.bodies.get_mut(&b) {
                body.contacted.remove(&a);
            }
        }

        if self.delegate.is_none() || (begins.is_empty() && ends.is_empty()) {
            return;
        }

        // Detach the delegate so callbacks can query the world.
        let mut delegate = self.delegate.take();
        if let Some(delegate) = delegate.as_mut() {
            for pair in &begins {
                let Some(contact) = self.contact_map.get(pair) else {
                    continue;
                };
                let (Some(a), Some(b)) =
                    (self.bodies.get(&pair.first()), self.bodies.get(&pair.second()))
                else {
                    continue;
                };
                if Body::should_notify(a, b) {
                    delegate.did_begin(self, contact);
                }
            }
            for pair in &ends {
                let (Some(a), Some(b)) =
                    (self.bodies.get(&pair.first()), self.bodies.get(&pair.second()))
                else {
                    continue;
                };
                if !Body::should_notify(a, b) {
                    continue;
                }
                let midpoint = nalgebra::center(&a.position, &b.position);
                let between = b.position - a.position;
                let norm = between.norm();
                let direction = if norm > 1e-12 {
                    between / norm
                } else {
                    Vector2::zeros()
                };
                let contact = Contact::new(a.id, b.id, midpoint, direction, 0.0);
                delegate.did_end(self, &contact);
            }
        }
        self.delegate = delegate;
    }
}

/// Narrow-phase decision for one pair.
struct PairOutcome {
    manifold: Manifold,
    collides: bool,
    resolution: Option<ImpulseResult>,
    correction_a: Vector2<f64>,
    correction_b: Vector2<f64>,
}
