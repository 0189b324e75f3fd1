//! Compression and scan throughput over a synthetic graph.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sympiezo_core::{
    build_adjacency_list, AdjacencyCursor, ListConfig, NodeAdjacency, PackedAdjacencyList,
    TailStrategy,
};

const NODE_COUNT: u64 = 10_000;
const MAX_DEGREE: u64 = 96;

const STRATEGIES: [TailStrategy; 3] = [
    TailStrategy::BlockAligned,
    TailStrategy::VarLongTail,
    TailStrategy::InlinedHead,
];

/// Deterministic pseudo-random adjacency data, identical across runs.
fn synthetic_graph() -> (Vec<NodeAdjacency>, u64) {
    let mut state = 0x9E3779B97F4A7C15u64;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 16
    };

    let mut edges = 0u64;
    let input = (0..NODE_COUNT)
        .map(|node| {
            let degree = next() % MAX_DEGREE;
            edges += degree;
            let targets = (0..degree).map(|_| next() % NODE_COUNT).collect();
            NodeAdjacency::new(node, targets)
        })
        .collect();
    (input, edges)
}

fn build(strategy: TailStrategy, input: Vec<NodeAdjacency>) -> PackedAdjacencyList {
    build_adjacency_list(
        ListConfig::sorted(strategy),
        NODE_COUNT as usize,
        input,
    )
    .expect("build succeeds")
}

fn bench_compress(c: &mut Criterion) {
    let (input, edges) = synthetic_graph();

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Elements(edges));
    for strategy in STRATEGIES {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &strategy,
            |b, &strategy| {
                b.iter_batched(
                    || input.clone(),
                    |input| build(strategy, input),
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let (input, edges) = synthetic_graph();

    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(edges));
    for strategy in STRATEGIES {
        let list = build(strategy, input.clone());
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &list,
            |b, list| {
                b.iter(|| {
                    let mut sum = 0u64;
                    for node in 0..NODE_COUNT {
                        let mut cursor = list.cursor(node).expect("list is live");
                        while let Some(target) = cursor.next() {
                            sum = sum.wrapping_add(target);
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_scan);
criterion_main!(benches);
