//! Criterion benchmarks for the maze engines.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mazemind::astar::AStarRun;
use mazemind::carve;
use mazemind::qlearn::{QConfig, QLearningRun};

/// Benchmark carving at growing (odd) grid sizes.
fn bench_carve(c: &mut Criterion) {
    let mut group = c.benchmark_group("carve");

    for size in [11usize, 21, 41, 81].iter() {
        group.bench_with_input(BenchmarkId::new("generate", size), size, |b, &size| {
            b.iter(|| {
                let grid = carve::generate(size, size, Some(42));
                black_box(grid.cells().len())
            });
        });
    }

    group.finish();
}

/// Benchmark a full A* run (search + replay) on carved mazes.
fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar");

    for size in [11usize, 21, 41, 81].iter() {
        let grid = carve::generate(*size, *size, Some(42));
        group.bench_with_input(BenchmarkId::new("run", size), size, |b, _| {
            b.iter(|| {
                let events = AStarRun::new(&grid).count();
                black_box(events)
            });
        });
    }

    group.finish();
}

/// Benchmark Q-learning training with a small fixed episode count so the
/// comparison tracks per-step cost rather than convergence time.
fn bench_qlearn(c: &mut Criterion) {
    let mut group = c.benchmark_group("qlearn");
    group.sample_size(20);

    for size in [7usize, 11, 15].iter() {
        let grid = carve::generate(*size, *size, Some(42));
        let cfg = QConfig {
            episodes: 50,
            seed: Some(7),
            ..QConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("train", size), size, |b, _| {
            b.iter(|| {
                let events = QLearningRun::new(&grid, cfg).count();
                black_box(events)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_carve, bench_astar, bench_qlearn);

criterion_main!(benches);
