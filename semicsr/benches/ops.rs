//! Sequential against concurrent sparse operations
//!
//! - flat multiply, one thread and one task per row
//! - block-recursive multiply with rayon fan-out
//! - diamond closure over a random weighted graph

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use semicsr::{
    block_multiply, block_multiply_parallel, diamond_closure, diamond_closure_concurrent,
    multiply, multiply_concurrent, Arithmetic, BlockConfig, CsrMatrix, PoolConfig, Semiring,
    Tropical,
};

fn random_matrix<S: Semiring<Value = f64>>(n: usize, density: f64, seed: u64) -> CsrMatrix<S> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut triplets = Vec::new();
    for row in 0..n {
        for col in 0..n {
            if rng.gen_bool(density) {
                triplets.push((row, col, f64::from(rng.gen_range(1u32..100))));
            }
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("Multiply");
    group.sample_size(20);
    let config = PoolConfig::default();

    for n in [128, 256, 512] {
        let m = random_matrix::<Arithmetic<f64>>(n, 0.02, n as u64);
        group.throughput(Throughput::Elements(m.nnz() as u64));

        group.bench_with_input(BenchmarkId::new("sequential", n), &m, |bench, m| {
            bench.iter(|| black_box(multiply(m, m)));
        });
        group.bench_with_input(BenchmarkId::new("concurrent", n), &m, |bench, m| {
            bench.iter(|| black_box(multiply_concurrent(m, m, &config).unwrap()));
        });
    }

    group.finish();
}

fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("BlockMultiply");
    group.sample_size(10);

    for n in [64, 128] {
        let m = random_matrix::<Arithmetic<f64>>(n, 0.05, 7);

        group.bench_with_input(BenchmarkId::new("sequential", n), &m, |bench, m| {
            bench.iter(|| black_box(block_multiply(m, m)));
        });
        group.bench_with_input(BenchmarkId::new("rayon", n), &m, |bench, m| {
            bench.iter(|| black_box(block_multiply_parallel(m, m, &BlockConfig::default())));
        });
    }

    group.finish();
}

fn bench_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("DiamondClosure");
    group.sample_size(10);
    let config = PoolConfig::default();

    for n in [64, 128] {
        let g = random_matrix::<Tropical<f64>>(n, 0.05, 11);

        group.bench_with_input(BenchmarkId::new("sequential", n), &g, |bench, g| {
            bench.iter(|| black_box(diamond_closure(g)));
        });
        group.bench_with_input(BenchmarkId::new("concurrent", n), &g, |bench, g| {
            bench.iter(|| black_box(diamond_closure_concurrent(g, &config).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multiply, bench_block, bench_closure);
criterion_main!(benches);
