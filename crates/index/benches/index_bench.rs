use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use index::{BuilderConfig, ModelBuilder, TrainingRecord};

fn corpus(size: usize) -> Vec<TrainingRecord> {
    let stems = [
        "starbucks", "shell oil", "walmart", "amazon mktplace pmts", "netflix com",
        "blue bottle coffee", "uber trip", "whole foods market",
    ];
    (0..size)
        .map(|i| {
            let stem = stems[i % stems.len()];
            TrainingRecord::new(i as u64, format!("{stem} {}", i / stems.len()))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [1_000usize, 10_000] {
        let records = corpus(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            let builder = ModelBuilder::new(BuilderConfig::default()).unwrap();
            b.iter(|| builder.build_from_records(black_box(records.clone())).unwrap())
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let builder = ModelBuilder::new(BuilderConfig::default()).unwrap();
    let model = builder.build_from_records(corpus(50_000)).unwrap();
    c.bench_function("lookup_50k", |b| {
        b.iter(|| model.lookup(black_box("starbucks 4521")))
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
