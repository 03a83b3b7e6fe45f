//! Benchmarks for the manager and a full game tick
//!
//! Run with: cargo bench

use bullet_purgatory::prelude::*;
use bullet_purgatory::systems::{Collider2DSystem, Physics2DSystem};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn moving_manager(count: usize) -> EcsManager {
    let mut manager = EcsManager::new();
    manager.register_system(Physics2DSystem::new());
    for i in 0..count {
        let entity = manager.create_entity();
        manager
            .register_component(entity, Transform2D::new(i as f32, 0.0, 0.0))
            .unwrap();
        manager
            .register_component(entity, Velocity2D::new(1.0, 2.0))
            .unwrap();
    }
    manager
}

// Bench: registering components with buckets already indexed
fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("register");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(moving_manager(count)));
        });
    }
    group.finish();
}

// Bench: one physics tick over N moving entities
fn bench_physics_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("physics_tick");

    for count in [100, 1_000, 10_000] {
        let mut manager = moving_manager(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| manager.run_tick(black_box(1.0 / 60.0)).unwrap());
        });
    }
    group.finish();
}

// Bench: pairwise collision scan
fn bench_collision_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_tick");

    for count in [50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut manager = EcsManager::new();
                    manager.register_system(Collider2DSystem::new());
                    for i in 0..count {
                        let entity = manager.create_entity();
                        let px = (i % 25) as f32 * 20.0;
                        let py = (i / 25) as f32 * 20.0;
                        manager
                            .register_component(entity, Transform2D::new(px, py, 0.0))
                            .unwrap();
                        manager
                            .register_component(entity, Collider2D::new(10.0, 10.0))
                            .unwrap();
                        if i % 2 == 0 {
                            manager.register_component(entity, BulletTag).unwrap();
                        } else {
                            manager.register_component(entity, Lives { count: 3 }).unwrap();
                        }
                    }
                    manager
                },
                |mut manager| manager.run_tick(1.0 / 60.0).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// Bench: full game tick with every system registered
fn bench_session_tick(c: &mut Criterion) {
    c.bench_function("session_tick", |b| {
        let surface: SurfaceRef = HeadlessSurface::new().into_shared();
        let config = GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        };
        let mut manager = EcsManager::new();
        build_session(&mut manager, &surface, &config, GameState::new(0, 5)).unwrap();
        manager.setup(&surface).unwrap();

        b.iter(|| manager.run_tick(black_box(1.0 / 60.0)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_register,
    bench_physics_tick,
    bench_collision_tick,
    bench_session_tick
);
criterion_main!(benches);
