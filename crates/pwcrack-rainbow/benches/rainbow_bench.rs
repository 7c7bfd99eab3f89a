//! Rainbow Table ベンチマーク（縮減版）
//!
//! 目的: CI/ローカルともに1分以内で完走する最小セットを提供する。

use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pwcrack_rainbow::{
    Alphabet, ChainBuilder, ChainIndex, Cracker, RainbowConfig, ReductionFamily,
    SearchCoordinator, compute_chain, hash_plaintext,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const STEPS: u32 = 200;
const LENGTH: usize = 6;

fn ci_criterion() -> Criterion {
    Criterion::default()
        .sample_size(15)
        .measurement_time(Duration::from_secs(8))
}

fn config() -> RainbowConfig {
    RainbowConfig::default()
        .with_alphabet(Alphabet::new("abcdefghijklmnopqrstuvwxyz0123456789").unwrap())
        .with_steps(STEPS)
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    let reduction = ReductionFamily::new(config().alphabet);
    let digest = hash_plaintext("bench");

    group.bench_function("reduce_len6", |b| {
        b.iter(|| reduction.reduce(black_box(&digest), black_box(17), LENGTH))
    });

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let reduction = ReductionFamily::new(config().alphabet);

    group.bench_function("compute_chain_full", |b| {
        b.iter(|| compute_chain(black_box("abc123"), STEPS, &reduction))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let config = config();
    let builder = ChainBuilder::new(&config);

    group.bench_function("parallel_rayon_1000", |b| {
        b.iter(|| {
            let mut index = ChainIndex::new();
            builder
                .build_with_rng(&mut index, 1000, LENGTH, &mut StdRng::seed_from_u64(1))
                .unwrap()
        })
    });

    group.finish();
}

fn bench_crack(c: &mut Criterion) {
    let mut group = c.benchmark_group("crack");
    let config = config();
    let mut index = ChainIndex::new();
    let builder = ChainBuilder::new(&config);
    for length in [5, 6, 7] {
        builder
            .build_with_rng(&mut index, 1000, length, &mut StdRng::seed_from_u64(2))
            .unwrap();
    }
    let reduction = ReductionFamily::new(config.alphabet.clone());
    // never stored: worst case for every length
    let miss = hash_plaintext("ZZZZZZ");

    group.bench_function("single_length_miss", |b| {
        let cracker = Cracker::new(&index, &reduction, STEPS);
        b.iter(|| cracker.crack(black_box(&miss), LENGTH).unwrap())
    });

    group.bench_function("all_lengths_miss", |b| {
        let coordinator = SearchCoordinator::new(&config, &index);
        b.iter(|| coordinator.crack_any_length(black_box(&miss)).unwrap())
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = ci_criterion();
    targets =
        bench_reduce,
        bench_chain,
        bench_build,
        bench_crack,
}

criterion_main!(benches);
