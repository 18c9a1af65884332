//! End-to-end simulation scenarios.
//!
//! Each test scripts a small scene through `World::simulate` and checks an
//! observable property: contact event completeness, tunneling prevention,
//! restitution bounds, query ordering, and settling behavior.

#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};
use planar_core::{
    Body, Contact, ContactDelegate, ConstraintSolverConfig, Field, Joint, SimpleScene, World,
};
use planar_types::{Aabb, BodyId, Transform2, WorldConfig};

/// Records every begin/end event through shared state.
#[derive(Default)]
struct EventLog {
    begins: Vec<Contact>,
    ends: Vec<Contact>,
}

struct Recorder(Rc<RefCell<EventLog>>);

impl ContactDelegate for Recorder {
    fn did_begin(&mut self, _world: &World, contact: &Contact) {
        self.0.borrow_mut().begins.push(*contact);
    }

    fn did_end(&mut self, _world: &World, contact: &Contact) {
        self.0.borrow_mut().ends.push(*contact);
    }
}

fn recording_world(config: WorldConfig) -> (World, Rc<RefCell<EventLog>>) {
    let mut world = World::new(config);
    let log = Rc::new(RefCell::new(EventLog::default()));
    world.set_delegate(Box::new(Recorder(Rc::clone(&log))));
    (world, log)
}

fn attach(world: &mut World, scene: &mut SimpleScene, body: Body, at: Point2<f64>) -> BodyId {
    let transform = Transform2::from_position(at);
    let node = scene.add_node(transform);
    world.add_body(body, node, transform)
}

/// A sensor fly-through must produce exactly one begin and one end.
///
/// Configuration:
/// - Probe: circle r=5 at (-30, 0), velocity (60, 0), notify-only masks
/// - Target: static circle r=5 at the origin
/// - 90 steps at 60 Hz: approach, overlap, separate
#[test]
fn begin_end_completeness() {
    let mut scene = SimpleScene::new();
    let (mut world, log) = recording_world(WorldConfig::zero_gravity());

    let mut probe = Body::circle(5.0);
    probe.velocity = Vector2::new(60.0, 0.0);
    probe.linear_damping = 0.0;
    probe.collision_bit_mask = 0;
    probe.contact_test_bit_mask = u32::MAX;
    let probe_id = attach(&mut world, &mut scene, probe, Point2::new(-30.0, 0.0));

    let mut target = Body::circle(5.0);
    target.is_dynamic = false;
    target.collision_bit_mask = 0;
    let target_id = attach(&mut world, &mut scene, target, Point2::new(0.0, 0.0));

    let mut overlapped_steps = 0;
    for _ in 0..90 {
        world.simulate(1.0 / 60.0, &mut scene);
        let touching = !world.contacts_of(probe_id).is_empty();
        if touching {
            overlapped_steps += 1;
        }
    }

    let log = log.borrow();
    assert!(overlapped_steps > 1, "the bodies must actually overlap");
    assert_eq!(log.begins.len(), 1, "exactly one begin");
    assert_eq!(log.ends.len(), 1, "exactly one end");
    assert_eq!(log.begins[0].pair(), log.ends[0].pair());
    assert!(log.begins[0].pair().involves(target_id));
    assert_eq!(log.ends[0].impulse, 0.0, "end contacts carry no impulse");

    // The probe sailed through unperturbed (notify-only masks).
    let probe = world.body(probe_id).unwrap();
    assert!(probe.position().x > 20.0);
    assert_relative_eq!(probe.velocity.x, 60.0, epsilon = 1e-9);
}

/// A CCD-flagged bullet must stop at a thin wall that a regular body
/// tunnels straight through.
#[test]
fn ccd_prevents_tunneling() {
    let wall_points = vec![Point2::new(-100.0, 0.0), Point2::new(100.0, 0.0)];

    let run = |precise: bool| -> f64 {
        let mut scene = SimpleScene::new();
        let mut world = World::new(WorldConfig::zero_gravity());

        attach(
            &mut world,
            &mut scene,
            Body::edge_chain(wall_points.clone()),
            Point2::new(0.0, 0.0),
        );

        let mut bullet = Body::circle(2.0);
        bullet.velocity = Vector2::new(0.0, -600.0);
        bullet.linear_damping = 0.0;
        bullet.uses_precise_collision_detection = precise;
        // 10 units per step from y=45: positions land at 5 and -5, so the
        // regular narrow phase never sees an overlap with the thin wall.
        let id = attach(&mut world, &mut scene, bullet, Point2::new(0.0, 45.0));

        for _ in 0..30 {
            world.simulate(1.0 / 60.0, &mut scene);
        }
        world.body(id).unwrap().position().y
    };

    let without_ccd = run(false);
    let with_ccd = run(true);

    assert!(
        without_ccd < 0.0,
        "at 10 units/step the regular narrow phase tunnels (got y = {without_ccd})"
    );
    assert!(
        with_ccd > 0.0,
        "the swept body must be stopped at the boundary (got y = {with_ccd})"
    );
}

/// Equal masses, head-on, restitution 1: relative normal speed is
/// preserved through the collision.
#[test]
fn elastic_collision_preserves_relative_speed() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::zero_gravity());

    let make = |vx: f64| {
        let mut body = Body::circle(5.0);
        body.velocity = Vector2::new(vx, 0.0);
        body.restitution = 1.0;
        body.friction = 0.0;
        body.linear_damping = 0.0;
        body
    };
    let left = attach(&mut world, &mut scene, make(10.0), Point2::new(-12.0, 0.0));
    let right = attach(&mut world, &mut scene, make(-10.0), Point2::new(12.0, 0.0));

    let before = 20.0;
    for _ in 0..60 {
        world.simulate(1.0 / 60.0, &mut scene);
    }

    let va = world.body(left).unwrap().velocity;
    let vb = world.body(right).unwrap().velocity;
    let after = (va - vb).norm();
    assert_relative_eq!(after, before, epsilon = 1e-6);
    // They bounced: the left body now travels left again.
    assert!(va.x < 0.0 && vb.x > 0.0);
}

/// `raycast_all` is sorted by distance and `raycast` returns its head.
#[test]
fn raycast_ordering() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::zero_gravity());

    // Deliberately attached out of spatial order.
    let far = attach(&mut world, &mut scene, Body::circle(3.0), Point2::new(80.0, 0.0));
    let near = attach(&mut world, &mut scene, Body::circle(3.0), Point2::new(20.0, 0.0));
    let middle = attach(&mut world, &mut scene, Body::circle(3.0), Point2::new(50.0, 0.0));

    let from = Point2::new(0.0, 0.0);
    let to = Point2::new(100.0, 0.0);

    let all = world.raycast_all(from, to);
    assert_eq!(all.len(), 3);
    let ids: Vec<BodyId> = all.iter().map(|hit| hit.body).collect();
    assert_eq!(ids, vec![near, middle, far]);
    for pair in all.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }

    let first = world.raycast(from, to).unwrap();
    assert_eq!(first.body, near);
    assert_relative_eq!(first.distance, 17.0, epsilon = 1e-9);
    assert_eq!(first.normal, Vector2::new(-1.0, 0.0));

    // Ray queries also drive the enumerate/first-match forms.
    assert!(world.body_along_ray(from, to).is_some());
    let mut visited = 0;
    world.enumerate_bodies_along_ray(from, to, |_body, stop| {
        visited += 1;
        *stop = true;
    });
    assert_eq!(visited, 1, "early stop honors the out-parameter");
}

/// Zero or negative dt leaves every body untouched.
#[test]
fn zero_dt_is_idempotent() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0)));

    let mut body = Body::circle(5.0);
    body.velocity = Vector2::new(3.0, 4.0);
    let id = attach(&mut world, &mut scene, body, Point2::new(1.0, 2.0));

    for dt in [0.0, -1.0, f64::NAN] {
        world.simulate(dt, &mut scene);
        let body = world.body(id).unwrap();
        assert_eq!(body.position(), Point2::new(1.0, 2.0));
        assert_eq!(body.velocity, Vector2::new(3.0, 4.0));
    }
    assert_eq!(world.step_count(), 0);

    // Pausing through the speed multiplier behaves the same way.
    world.set_speed(0.0);
    world.simulate(1.0 / 60.0, &mut scene);
    assert_eq!(world.body(id).unwrap().position(), Point2::new(1.0, 2.0));
}

/// The canonical settling scenario: a ball dropped inside an edge-loop
/// box comes to rest on its floor, with exactly one begin event.
///
/// Configuration:
/// - Boundary: edge loop over [-100, 0] x [100, 200]
/// - Ball: circle r=10 at (0, 100), restitution 0, gravity (0, -980)
#[test]
fn dropped_circle_rests_on_edge_loop() {
    let mut scene = SimpleScene::new();
    let (mut world, log) =
        recording_world(WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0)));

    attach(
        &mut world,
        &mut scene,
        Body::edge_loop(Aabb::new(Point2::new(-100.0, 0.0), Point2::new(100.0, 200.0))),
        Point2::new(0.0, 0.0),
    );

    let mut ball = Body::circle(10.0);
    ball.restitution = 0.0;
    ball.contact_test_bit_mask = u32::MAX;
    let ball_id = attach(&mut world, &mut scene, ball, Point2::new(0.0, 100.0));

    for _ in 0..600 {
        world.simulate(1.0 / 60.0, &mut scene);
    }

    let ball = world.body(ball_id).unwrap();
    assert!(
        (ball.position().y - 10.0).abs() < 1.0,
        "rests at the floor plus its radius (got y = {})",
        ball.position().y
    );
    assert!(ball.is_resting(), "the ball settles to rest");
    assert_eq!(ball.velocity, Vector2::zeros());

    let log = log.borrow();
    assert_eq!(log.begins.len(), 1, "one touch, one begin");
    assert!(log.ends.is_empty(), "the ball never leaves the floor");
}

/// An exclusive field's non-zero force suppresses every other field.
#[test]
fn exclusive_field_short_circuits() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::zero_gravity());

    scene.add_field(
        Field::linear_gravity(Vector2::new(1.0, 0.0)).with_strength(1_000.0),
        Point2::origin(),
    );
    scene.add_field(
        Field::linear_gravity(Vector2::new(-1.0, 0.0))
            .with_strength(10.0)
            .exclusive(),
        Point2::origin(),
    );

    let mut body = Body::circle(1.0);
    body.linear_damping = 0.0;
    let id = attach(&mut world, &mut scene, body, Point2::new(0.0, 0.0));

    world.simulate(1.0 / 60.0, &mut scene);

    let body = world.body(id).unwrap();
    assert!(
        body.velocity.x < 0.0,
        "only the exclusive field contributes (got vx = {})",
        body.velocity.x
    );

    // The probe sampler agrees with the integration pass.
    let sampled = world.sample_fields(&mut scene, Point2::new(30.0, 0.0));
    assert!(sampled.x < 0.0);
}

/// A fixed joint holds a hanging body against gravity and reports the
/// load it carries.
#[test]
fn fixed_joint_carries_a_hanging_body() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0)));
    world.set_constraint_config(ConstraintSolverConfig {
        stiffness: 100_000.0,
        ..ConstraintSolverConfig::default()
    });

    let mut anchor = Body::rectangle(Vector2::new(10.0, 10.0));
    anchor.is_dynamic = false;
    let anchor_id = attach(&mut world, &mut scene, anchor, Point2::new(0.0, 0.0));

    let mut hanging = Body::circle(5.0);
    let weight = hanging.mass() * 980.0;
    let hanging_id = attach(&mut world, &mut scene, hanging, Point2::new(0.0, -20.0));

    let joint_id = world
        .add_joint(Joint::fixed(anchor_id, hanging_id, Point2::new(0.0, -10.0)))
        .unwrap();

    for _ in 0..600 {
        world.simulate(1.0 / 60.0, &mut scene);
    }

    let hanging = world.body(hanging_id).unwrap();
    assert!(
        (hanging.position().y + 20.0).abs() < 3.0,
        "held near its bound offset (got y = {})",
        hanging.position().y
    );

    let joint = world.joint(joint_id).unwrap();
    assert!(
        joint.reaction_force.y > 0.6 * weight && joint.reaction_force.y < 1.4 * weight,
        "the reaction roughly carries the body's weight (got {}, weight {})",
        joint.reaction_force.y,
        weight
    );
}

/// A pinned body never translates, whatever hits it.
#[test]
fn pinned_body_holds_position() {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::zero_gravity());

    let mut pinned = Body::rectangle(Vector2::new(20.0, 20.0));
    pinned.pinned = true;
    let pinned_id = attach(&mut world, &mut scene, pinned, Point2::new(0.0, 0.0));

    let mut hammer = Body::circle(5.0);
    hammer.velocity = Vector2::new(-120.0, 0.0);
    attach(&mut world, &mut scene, hammer, Point2::new(40.0, 0.0));

    for _ in 0..120 {
        world.simulate(1.0 / 60.0, &mut scene);
    }

    let pinned = world.body(pinned_id).unwrap();
    assert_eq!(pinned.position(), Point2::new(0.0, 0.0));
}
