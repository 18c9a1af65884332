//! Benchmarks for the collision pipeline.
//!
//! Run with: cargo bench -p planar-core

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::{Point2, Vector2};
use std::hint::black_box;

use planar_core::{Body, SimpleScene, World};
use planar_types::{Aabb, Transform2, WorldConfig};

/// A box of bouncing circles, the worst case for the pairwise narrow
/// phase: everything is dynamic and everything eventually touches.
fn build_ball_pit(count: usize) -> (World, SimpleScene) {
    let mut scene = SimpleScene::new();
    let mut world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, -980.0)));

    let bounds = Aabb::new(Point2::new(-500.0, 0.0), Point2::new(500.0, 600.0));
    let boundary_node = scene.add_node(Transform2::identity());
    world.add_body(Body::edge_loop(bounds), boundary_node, Transform2::identity());

    // Deterministic lattice placement, no RNG needed.
    let columns = 20;
    for i in 0..count {
        let column = (i % columns) as f64;
        let row = (i / columns) as f64;
        let at = Point2::new(-475.0 + column * 48.0, 30.0 + row * 35.0);
        let transform = Transform2::from_position(at);
        let node = scene.add_node(transform);
        world.add_body(Body::circle(12.0), node, transform);
    }
    (world, scene)
}

fn bench_simulate_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_step");
    for count in [16, 64, 256] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut world, mut scene) = build_ball_pit(count);
            // Warm up so the bodies are settled into contact.
            for _ in 0..120 {
                world.simulate(1.0 / 60.0, &mut scene);
            }
            b.iter(|| {
                world.simulate(black_box(1.0 / 60.0), &mut scene);
            });
        });
    }
    group.finish();
}

fn bench_raycast_all(c: &mut Criterion) {
    let (world, _scene) = build_ball_pit(256);
    c.bench_function("raycast_all_256", |b| {
        b.iter(|| {
            let hits = world.raycast_all(
                black_box(Point2::new(-500.0, 300.0)),
                black_box(Point2::new(500.0, 300.0)),
            );
            black_box(hits)
        });
    });
}

criterion_group!(benches, bench_simulate_step, bench_raycast_all);
criterion_main!(benches);
