//! Criterion benchmark: one full frame of the placement pipeline.
//!
//! Drives `TestSession` (headless App + `PlacementPlugin` + fake renderer)
//! with a tap every frame so ingest, resolution, command execution and the
//! status publish all run.
//!
//! Run with: cargo bench -p placement --bench session_bench --features bench

use bevy::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use placement::test_harness::{floor, TestSession};

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement_frame");
    group.sample_size(20);
    for surfaces in [1u64, 32] {
        let mut session = TestSession::new()
            .started(1)
            .with_surfaces((1..=surfaces).map(|id| floor(id, 1.0)).collect());
        let mut step = 0u32;
        group.bench_with_input(BenchmarkId::from_parameter(surfaces), &surfaces, |b, _| {
            b.iter(|| {
                step = step.wrapping_add(1);
                let t = step as f32 * 0.1;
                session.tap_world(Vec3::new(t.sin() * 0.5, 0.0, t.cos() * 0.5));
                session.tick();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
