//! Micro-benchmarks for table pushes and selection.
//!
//! These benchmarks measure the raw cost of the push paths (eager vs
//! deferred weight recomputation) and of selection with and without a
//! distribution rebuild.
//!
//! Run with:
//! ```bash
//! cargo bench --bench bhpt
//! ```

use bhpt_rs::{Bhpt, BhptConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generate deterministic random pushes for reproducible benchmarks.
fn random_pushes(seed: u64, capacity: usize, count: usize) -> Vec<(usize, bool)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.random_range(0..capacity), rng.random_bool(0.5)))
        .collect()
}

/// Build a table with every entry holding a random history.
fn populated(capacity: usize, defer: bool) -> Bhpt {
    let mut table = Bhpt::new(
        BhptConfig::new(capacity, 64)
            .with_defer(defer)
            .with_seed(42),
    )
    .unwrap();
    for (e, s) in random_pushes(7, capacity, capacity * 8) {
        table.push(e, s).unwrap();
    }
    table
}

// ============================================================================
// Benchmark: push (eager vs deferred weight recomputation)
// ============================================================================

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("bhpt/push");

    for capacity in [256, 1024, 4096] {
        let pushes = random_pushes(42, capacity, capacity * 4);
        group.throughput(Throughput::Elements(pushes.len() as u64));

        for (mode, defer) in [("eager", false), ("deferred", true)] {
            group.bench_with_input(
                BenchmarkId::new(mode, capacity),
                &pushes,
                |b, pushes| {
                    b.iter_with_setup(
                        || {
                            Bhpt::new(
                                BhptConfig::new(capacity, 64)
                                    .with_defer(defer)
                                    .with_seed(1),
                            )
                            .unwrap()
                        },
                        |mut table| {
                            for &(e, s) in pushes {
                                table.push(e, s).unwrap();
                            }
                            table
                        },
                    );
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: select against a warm distribution cache
// ============================================================================

fn bench_select_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("bhpt/select_cached");

    for capacity in [256, 1024, 4096] {
        let mut table = populated(capacity, false);
        table.select().unwrap(); // Warm the cache.

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, _| {
                b.iter(|| table.select().unwrap());
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: select forcing a rebuild on every draw
// ============================================================================

fn bench_select_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("bhpt/select_rebuild");

    for (mode, defer) in [("eager", false), ("deferred", true)] {
        for capacity in [256, 1024, 4096] {
            let mut table = populated(capacity, defer);
            let mut rng = ChaCha8Rng::seed_from_u64(99);

            group.throughput(Throughput::Elements(1));
            group.bench_with_input(
                BenchmarkId::new(mode, capacity),
                &capacity,
                |b, &capacity| {
                    b.iter(|| {
                        let e = rng.random_range(0..capacity);
                        table.push(e, rng.random_bool(0.5)).unwrap();
                        table.select().unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_push, bench_select_cached, bench_select_rebuild);
criterion_main!(benches);
