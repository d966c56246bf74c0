//! Linear algebra benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ndkit::prelude::*;
use std::hint::black_box;

fn well_conditioned(n: usize) -> Vec<f32> {
    let mut data: Vec<f32> = (0..n * n)
        .map(|i| ((i * 31 + 7) % 97) as f32 / 97.0 - 0.5)
        .collect();
    for i in 0..n {
        data[i * n + i] += n as f32;
    }
    data
}

fn bench_matmul(c: &mut Criterion) {
    let device = Device::cpu();
    let client = Client::new();
    let mut group = c.benchmark_group("matmul_f32");
    for n in [32usize, 128, 256] {
        let a = Tensor::from_slice(&well_conditioned(n), &[n, n], &device).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| black_box(client.matmul(&a, &a).unwrap()))
        });
    }
    group.finish();
}

fn bench_factorizations(c: &mut Criterion) {
    let device = Device::cpu();
    let client = Client::new();
    let mut group = c.benchmark_group("factorizations_f32");
    for n in [16usize, 64] {
        let a = Tensor::from_slice(&well_conditioned(n), &[n, n], &device).unwrap();
        group.bench_with_input(BenchmarkId::new("det", n), &n, |bench, _| {
            bench.iter(|| black_box(client.det(&a).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("inverse", n), &n, |bench, _| {
            bench.iter(|| black_box(client.inverse(&a).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("lu", n), &n, |bench, _| {
            bench.iter(|| black_box(client.lu(&a).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("svd", n), &n, |bench, _| {
            bench.iter(|| black_box(client.svd(&a).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_matmul, bench_factorizations);
criterion_main!(benches);
