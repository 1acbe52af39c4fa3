use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vendorid::{
    extract_batch, BuilderConfig, InMemoryResolver, MatchConfig, ModelBuilder, ResolvedName,
    TrainingRecord, VendorExtractor,
};

const STEMS: &[&str] = &[
    "starbucks", "shell oil", "walmart", "amazon mktplace pmts", "netflix com",
    "blue bottle coffee", "uber trip", "whole foods market",
];

fn extractor(size: usize) -> VendorExtractor {
    let names: Vec<(u64, String)> = (0..size)
        .map(|i| (i as u64, format!("{} {}", STEMS[i % STEMS.len()], i / STEMS.len())))
        .collect();
    let model = ModelBuilder::new(BuilderConfig::default())
        .unwrap()
        .build_from_records(names.iter().map(|(id, name)| TrainingRecord::new(*id, name.clone())))
        .unwrap();
    let resolver: InMemoryResolver = names
        .into_iter()
        .map(|(id, name)| ResolvedName::new(id, name, id % 97))
        .collect();
    VendorExtractor::new(Arc::new(model), resolver, MatchConfig::default()).unwrap()
}

fn queries() -> Vec<Option<String>> {
    (0..1_000)
        .map(|i| Some(format!("{} #{} 01/15 SEATTLE WA", STEMS[i % STEMS.len()].to_uppercase(), i)))
        .collect()
}

fn bench_extract_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_vendor");
    for size in [1_000usize, 50_000] {
        let extractor = extractor(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &extractor, |b, extractor| {
            b.iter(|| extractor.extract_vendor(black_box(Some("STARBUCKS #4521 SEATTLE WA"))))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let extractor = extractor(10_000);
    let queries = queries();
    let mut group = c.benchmark_group("extract_batch");
    group.throughput(Throughput::Elements(queries.len() as u64));
    for parallel in [false, true] {
        group.bench_with_input(BenchmarkId::from_parameter(parallel), &parallel, |b, &parallel| {
            b.iter(|| extract_batch(&extractor, black_box(&queries), parallel))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract_one, bench_batch);
criterion_main!(benches);
