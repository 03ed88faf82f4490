use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ridge_world::{Section, SectionOrigin, SectionStore, TerrainConfig};

fn bench_generate_section(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_section");
    let cfg = TerrainConfig::default();
    group.bench_function("default_40x5", |b| {
        let mut stream = 0u64;
        b.iter(|| {
            stream += 1;
            black_box(Section::generate(&cfg, stream));
        })
    });
    group.finish();
}

fn bench_first_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_query");
    let cfg = Arc::new(TerrainConfig::default());
    // One cold query places and blends a full 3x3 block
    group.bench_function("height_cold_3x3", |b| {
        b.iter(|| {
            let mut store = SectionStore::inline(Arc::clone(&cfg));
            black_box(store.height(0.5, 0.5));
        })
    });
    group.finish();
}

fn bench_warm_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_queries");
    let mut store = SectionStore::inline(Arc::new(TerrainConfig::default()));
    store.view(SectionOrigin::new(0, 0));
    group.bench_function("height_1k", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for i in 0..1000 {
                let t = i as f32 * 0.039;
                acc += store.height(t, 39.0 - t);
            }
            black_box(acc);
        })
    });
    group.bench_function("normal_1k", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for i in 0..1000 {
                let t = 1.0 + i as f32 * 0.037;
                acc += store.normal(t, t).y;
            }
            black_box(acc);
        })
    });
    group.finish();
}

fn configure() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = configure();
    targets = bench_generate_section, bench_first_query, bench_warm_queries
}
criterion_main!(benches);
