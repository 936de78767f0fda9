//! Benchmarks for EmberKV storage operations

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use emberkv::{Config, Engine};

fn bench_put(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .buffer_entry_limit(10_000)
        .wal_sync(emberkv::SyncPolicy::Manual)
        .build();
    let engine = Engine::open(config).unwrap();

    let mut i = 0u64;
    c.bench_function("put", |b| {
        b.iter(|| {
            let key = format!("key{:012}", i);
            i += 1;
            engine.put(key.as_bytes(), b"value-payload").unwrap();
        })
    });
}

fn bench_get_buffered(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .buffer_entry_limit(10_000)
        .wal_sync(emberkv::SyncPolicy::Manual)
        .build();
    let engine = Engine::open(config).unwrap();

    for i in 0..1_000u64 {
        let key = format!("key{:06}", i);
        engine.put(key.as_bytes(), b"value-payload").unwrap();
    }

    let mut i = 0u64;
    c.bench_function("get_buffered", |b| {
        b.iter(|| {
            let key = format!("key{:06}", i % 1_000);
            i += 1;
            engine.get(key.as_bytes()).unwrap();
        })
    });
}

criterion_group!(benches, bench_put, bench_get_buffered);
criterion_main!(benches);
