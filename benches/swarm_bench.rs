//! Swarm benchmarks: index rebuild, flocking tick and fuzzy decisions

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use swarm_intel::agent::{SpawnArea, SwarmSetup};
use swarm_intel::core::config::SimulationConfig;
use swarm_intel::core::types::Rect;
use swarm_intel::events::NullSink;
use swarm_intel::fuzzy::{Consequent, DecisionInput, FuzzyDecisionEngine, FuzzyRule};
use swarm_intel::spatial::QuadTree;
use swarm_intel::swarm::SwarmEngine;

const SIZES: [usize; 4] = [100, 500, 1000, 2000];

fn bench_quadtree_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_rebuild");

    for &n in SIZES.iter() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points: Vec<(usize, Vec2)> = (0..n)
            .map(|i| {
                let x = rng.gen_range(-500.0..500.0);
                let y = rng.gen_range(-500.0..500.0);
                (i, Vec2::new(x, y))
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, points| {
            let mut tree = QuadTree::with_default_capacity(Rect::new(-1000.0, -1000.0, 2000.0, 2000.0))
                .expect("valid bounds");
            b.iter(|| black_box(tree.rebuild(points.iter().copied())));
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("swarm_tick");

    for &n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut config = SimulationConfig::default();
            config.emit_agent_updates = false;
            let setup = SwarmSetup {
                agent_count: n,
                spawn_area: SpawnArea::square(200.0),
                ..SwarmSetup::default()
            };
            let mut engine =
                SwarmEngine::from_setup(config, &setup, Arc::new(NullSink)).expect("valid setup");
            b.iter(|| black_box(engine.tick(0.016).expect("positive dt")));
        });
    }

    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let mut engine = FuzzyDecisionEngine::with_standard_sets(Arc::new(NullSink)).expect("standard sets");
    engine
        .register_rule(
            FuzzyRule::new("retreat", Consequent::new("velocity", "fast", 1.0))
                .and("threat", "high")
                .not("health", "high"),
        )
        .expect("valid rule");
    engine
        .register_rule(
            FuzzyRule::new("hold", Consequent::new("velocity", "slow", 1.0))
                .and("threat", "low")
                .or("distance", "close"),
        )
        .expect("valid rule");

    let input = DecisionInput::default()
        .with_value("threat", 75.0)
        .with_value("health", 45.0)
        .with_value("distance", 4.0);

    c.bench_function("fuzzy_decide", |b| {
        b.iter(|| black_box(engine.decide(black_box(&input)).expect("finite input")))
    });
}

criterion_group!(benches, bench_quadtree_rebuild, bench_tick, bench_decide);
criterion_main!(benches);
