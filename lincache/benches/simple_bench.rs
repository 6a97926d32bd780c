use std::hint::black_box;

use criterion::{
    BenchmarkId,
    Criterion,
    criterion_group,
    criterion_main,
};
use lincache::{
    Cache,
    LinkedMap,
    Policy,
    Touch,
};

const SIZE: u64 = 10_000;

macro_rules! bench_set {
    ($bench_set:ident, $policy:expr) => {
        mod $bench_set {
            use super::*;

            fn filled() -> Cache<u64, u64> {
                let mut cache = Cache::new(SIZE as usize, $policy).unwrap();
                cache.try_extend((0..SIZE).map(|i| (i, i))).unwrap();
                cache
            }

            pub fn bench_set_update(c: &mut Criterion) {
                let mut group = c.benchmark_group(format!("{}_set_update", $policy));
                group.bench_function(BenchmarkId::from_parameter(SIZE), |b| {
                    let mut cache = filled();
                    b.iter(|| {
                        for i in 0..SIZE {
                            black_box(cache.set(i, i).unwrap());
                        }
                    });
                });
                group.finish();
            }

            pub fn bench_set_evict(c: &mut Criterion) {
                let mut group = c.benchmark_group(format!("{}_set_evict", $policy));
                group.bench_function(BenchmarkId::from_parameter(SIZE), |b| {
                    let mut cache = filled();
                    let mut next = SIZE;
                    b.iter(|| {
                        for _ in 0..SIZE {
                            black_box(cache.set(next, next).unwrap());
                            next += 1;
                        }
                    });
                });
                group.finish();
            }

            pub fn bench_get(c: &mut Criterion) {
                let mut group = c.benchmark_group(format!("{}_get", $policy));
                group.bench_function(BenchmarkId::from_parameter(SIZE), |b| {
                    let mut cache = filled();
                    b.iter(|| {
                        for i in 0..SIZE {
                            black_box(cache.get(&i).unwrap());
                        }
                    });
                });
                group.finish();
            }

            pub fn bench_remove(c: &mut Criterion) {
                let mut group = c.benchmark_group(format!("{}_remove", $policy));
                group.bench_function(BenchmarkId::from_parameter(SIZE), |b| {
                    b.iter_batched(
                        filled,
                        |mut cache| {
                            for i in 0..SIZE {
                                black_box(cache.remove(&i).unwrap());
                            }
                        },
                        criterion::BatchSize::LargeInput,
                    );
                });
                group.finish();
            }
        }
    };
}

bench_set!(lru, Policy::Lru);
bench_set!(mru, Policy::Mru);

fn bench_map_iter(c: &mut Criterion) {
    let map: LinkedMap<u64, u64> = (0..SIZE).map(|i| (i, i)).collect();
    let mut group = c.benchmark_group("linked_map_traversal");
    group.bench_function(BenchmarkId::new("iter", SIZE), |b| {
        b.iter(|| black_box(map.values().sum::<u64>()));
    });
    group.bench_function(BenchmarkId::new("cursor", SIZE), |b| {
        b.iter(|| {
            let mut cursor = map.cursor();
            let mut sum = 0;
            while let Some(value) = cursor.next_value(&map).unwrap() {
                sum += value;
            }
            black_box(sum)
        });
    });
    group.finish();
}

fn bench_map_touch(c: &mut Criterion) {
    let mut map: LinkedMap<u64, u64> = (0..SIZE).map(|i| (i, i)).collect();
    c.bench_function("linked_map_touch_as_old", |b| {
        b.iter(|| {
            for i in 0..SIZE {
                black_box(map.get(&i, Touch::AsOld));
            }
        });
    });
}

criterion_group!(
    benches,
    lru::bench_set_update,
    lru::bench_set_evict,
    lru::bench_get,
    lru::bench_remove,
    mru::bench_set_update,
    mru::bench_set_evict,
    mru::bench_get,
    mru::bench_remove,
    bench_map_iter,
    bench_map_touch,
);
criterion_main!(benches);
