use canonical::normalize_transaction_name;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let samples = [
        "STARBUCKS #4521 SEATTLE",
        "POS DEBIT XXXXXXXX1234 01/15 WAL-MART SUPERCENTER #5678 BENTONVILLE AR",
        "ACH ELECTRONIC DEBIT ___ NETFLIX.COM 866-579-7172 CA 12/31 X XXXXX",
    ];
    for (idx, text) in samples.iter().enumerate() {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("sample_{idx}"), |b| {
            b.iter(|| normalize_transaction_name(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
