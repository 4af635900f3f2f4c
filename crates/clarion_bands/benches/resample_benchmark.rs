//! Benchmarks for the curve resampling and canonicalization hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use clarion_bands::{canonical_form, expand, resample, BandMode};

fn bench_resample(c: &mut Criterion) {
    let gains: Vec<i32> = (0..10).map(|i| i * 13 % 100 - 50).collect();

    c.bench_function("resample_10_to_20", |b| {
        b.iter(|| resample(black_box(&gains), BandMode::Ten, BandMode::Twenty))
    });

    c.bench_function("resample_10_to_15", |b| {
        b.iter(|| resample(black_box(&gains), BandMode::Ten, BandMode::Fifteen))
    });
}

fn bench_expand(c: &mut Criterion) {
    let gains = [10, -20, 30, -40, 50, -60, 70, -80, 90, -100];

    c.bench_function("expand_wire_form", |b| b.iter(|| expand(black_box(&gains))));
}

fn bench_canonical_form(c: &mut Criterion) {
    let serialized = "010,-20,30,-040,50,-60,70,-80,90,-100";

    c.bench_function("canonical_form", |b| {
        b.iter(|| canonical_form(black_box(serialized)))
    });
}

criterion_group!(benches, bench_resample, bench_expand, bench_canonical_form);
criterion_main!(benches);
