//! Benchmarks for the encoding pipelines.
//!
//! Covers the main cost centers:
//! - single-word encodes with few vs many alternatives
//! - multi-word composition (three encodes per call)
//! - language detection alone
//! - Daitch-Mokotoff branching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use beidermorse::prelude::*;

fn bench_names() -> Vec<(&'static str, &'static str)> {
    vec![
        ("short", "Smith"),
        ("branching", "Schwarzenegger"),
        ("accented", "Müller"),
        ("compound_prefix", "Ben David"),
        ("compound_plain", "Smith John"),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for accuracy in [Accuracy::Approximate, Accuracy::Exact] {
        let encoder = BeiderMorse::new(NameType::Generic, accuracy);
        for (label, name) in bench_names() {
            let id = BenchmarkId::new(format!("{accuracy:?}"), label);
            group.bench_with_input(id, &name, |b, name| {
                b.iter(|| encoder.encode(black_box(name)).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let encoder = BeiderMorse::new(NameType::Generic, Accuracy::Approximate);
    c.bench_function("detect", |b| {
        b.iter(|| {
            for (_, name) in bench_names() {
                black_box(encoder.detect(black_box(name)).unwrap());
            }
        });
    });
}

fn bench_dm_soundex(c: &mut Criterion) {
    let mut group = c.benchmark_group("dm_soundex");
    for (label, name) in [("plain", "Smith"), ("branching", "Rosochowaciec")] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &name, |b, name| {
            b.iter(|| black_box(dm_soundex(black_box(name))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_detect, bench_dm_soundex);
criterion_main!(benches);
