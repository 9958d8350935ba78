//! Benchmarks for haul-cache throughput and operations

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use haul_cache::{CacheConfig, CacheService, RateLimitConfig, RateLimitService};
use std::hint::black_box;
use std::time::Duration;

fn create_cache(max_size: usize) -> CacheService {
    CacheService::new(
        CacheConfig::default()
            .with_ttl(Duration::from_secs(3600))
            .with_max_size(max_size),
    )
}

fn bench_set(c: &mut Criterion) {
    let cache = create_cache(10_000);

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("small_value", |b| {
        b.iter(|| cache.set(black_box("key"), black_box(42i32), None));
    });

    group.bench_function("medium_value", |b| {
        let value = "x".repeat(1024); // 1KB
        b.iter(|| cache.set(black_box("key"), black_box(value.clone()), None));
    });

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let cache = create_cache(10_000);
    cache.set("key", 42i32, None);

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hit", |b| {
        b.iter(|| black_box(cache.get::<i32>(black_box("key"))));
    });

    group.bench_function("miss", |b| {
        b.iter(|| black_box(cache.get::<i32>(black_box("nonexistent"))));
    });

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("evict");
    group.throughput(Throughput::Elements(1));

    for capacity in [100, 1_000] {
        let cache = create_cache(capacity);
        for i in 0..capacity {
            cache.set(&format!("key:{i}"), i, None);
        }

        group.bench_function(format!("set_at_capacity_{capacity}"), |b| {
            let mut i = 0usize;
            b.iter(|| {
                i = i.wrapping_add(1);
                cache.set(&format!("new:{i}"), i, None);
            });
        });
    }

    group.finish();
}

fn bench_mixed_workload(c: &mut Criterion) {
    let cache = create_cache(10_000);
    for i in 0..100u64 {
        cache.set(&format!("key:{}", i), i, None);
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(100));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            for _ in 0..100 {
                i = i.wrapping_add(1);
                if i % 5 == 0 {
                    // 20% writes
                    cache.set(&format!("key:{}", i % 100), i, None);
                } else {
                    // 80% reads
                    black_box(cache.get::<u64>(&format!("key:{}", i % 100)));
                }
            }
        });
    });

    group.finish();
}

fn bench_rate_limit(c: &mut Criterion) {
    let limiter = RateLimitService::new();
    let config = RateLimitConfig::new("bench", u32::MAX, Duration::from_secs(3600))
        .expect("valid config");

    let mut group = c.benchmark_group("rate_limit");
    group.throughput(Throughput::Elements(1));

    group.bench_function("is_allowed", |b| {
        b.iter(|| black_box(limiter.is_allowed(black_box(&config))));
    });

    group.bench_function("check", |b| {
        b.iter(|| black_box(limiter.check(black_box(&config))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_eviction,
    bench_mixed_workload,
    bench_rate_limit
);
criterion_main!(benches);
