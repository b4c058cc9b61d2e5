//! Benchmarks for expression-engine contraction.
//!
//! Run with:
//! ```bash
//! cargo bench --bench contraction
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use ricci_core::{Tag, Tensor};

const I: Tag = Tag::new('i');
const J: Tag = Tag::new('j');
const K: Tag = Tag::new('k');

fn bench_matmul(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");

    for extent in [4usize, 8, 16] {
        let a = Tensor::<f64>::random_uniform(extent, 2, -1.0, 1.0);
        let b = Tensor::<f64>::random_uniform(extent, 2, -1.0, 1.0);

        group.throughput(Throughput::Elements((extent * extent * extent) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(extent), &extent, |bench, _| {
            bench.iter(|| {
                let mut out = Tensor::<f64>::zeros(extent, 2);
                out.idx_mut(&[I, J])
                    .assign(black_box(&a).idx(&[I, K]) * black_box(&b).idx(&[K, J]));
                black_box(out);
            });
        });
    }

    group.finish();
}

fn bench_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace");

    for extent in [4usize, 16, 64] {
        let m = Tensor::<f64>::random_uniform(extent, 2, -1.0, 1.0);

        group.throughput(Throughput::Elements(extent as u64));
        group.bench_with_input(BenchmarkId::from_parameter(extent), &extent, |bench, _| {
            bench.iter(|| black_box(black_box(&m).idx(&[I, I]).eval()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matmul, bench_trace);
criterion_main!(benches);
