use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdd_bench::random_digests;
use mdd_core::BloomFilter;

fn bench_filter(c: &mut Criterion) {
    let known = random_digests(100_000);
    let probes = random_digests(10_000);
    let mut bf = BloomFilter::new(known.len() as u64, 0.01).unwrap();
    for d in &known { bf.add(d); }

    c.bench_function("add", |b| {
        let mut f = BloomFilter::new(known.len() as u64, 0.01).unwrap();
        b.iter(|| for d in &known[..1000] { f.add(black_box(d)) })
    });
    c.bench_function("lookup_hit", |b| b.iter(|| known[..1000].iter().filter(|d| bf.lookup(d)).count()));
    c.bench_function("lookup_miss", |b| b.iter(|| probes.iter().filter(|d| bf.lookup(d)).count()));
    c.bench_function("save", |b| b.iter(|| {
        let mut out = Vec::with_capacity(32 + bf.byte_size());
        bf.save(&mut out).unwrap();
        black_box(out)
    }));
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
