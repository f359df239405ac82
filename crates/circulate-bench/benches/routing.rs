//! Criterion micro-benchmarks for routing and the barrier-field transform.

use circulate_bench::{open_hall, pillared_hall};
use circulate_core::{CellId, Generation};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Benchmark: single-source Dijkstra over all 10K cells of a 100x100 hall.
fn bench_shortest_path_costs_10k(c: &mut Criterion) {
    let floor = open_hall(100).unwrap();
    let source = CellId(0);

    c.bench_function("shortest_path_costs_10k", |b| {
        b.iter(|| {
            let tree = floor.map().shortest_path_costs(source, Generation::ZERO).unwrap();
            black_box(tree);
        });
    });
}

/// Benchmark: corner-to-corner route with early exit on a 100x100 hall.
fn bench_shortest_path_corner_to_corner(c: &mut Criterion) {
    let floor = open_hall(100).unwrap();
    let goal = CellId(floor.cell_count() as u32 - 1);

    c.bench_function("shortest_path_corner_to_corner", |b| {
        b.iter(|| {
            let path = floor.map().shortest_path(CellId(0), goal, Generation::ZERO).unwrap();
            black_box(path);
        });
    });
}

/// Benchmark: barrier-field construction on a pillared 64x64 hall, serial vs rayon.
fn bench_barrier_field(c: &mut Criterion) {
    let template = pillared_hall(64).unwrap();

    let mut group = c.benchmark_group("barrier_field_4k");
    group.bench_function("serial", |b| {
        b.iter(|| {
            let mut floor = template.clone();
            floor.build_barrier_field(usize::MAX, false);
            black_box(floor.barrier_field().len());
        });
    });
    group.bench_function("parallel", |b| {
        b.iter(|| {
            let mut floor = template.clone();
            floor.build_barrier_field(usize::MAX, true);
            black_box(floor.barrier_field().len());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_shortest_path_costs_10k,
    bench_shortest_path_corner_to_corner,
    bench_barrier_field
);
criterion_main!(benches);
