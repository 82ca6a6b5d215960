use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use std::hint::black_box;

use storable::{PersistentStore, Storage, Store};

#[derive(Clone, Serialize, Deserialize)]
struct State {
    counter: usize,
    name: String,
}

fn state() -> State {
    State {
        counter: 0,
        name: "test".to_string(),
    }
}

fn store_set_benchmark(c: &mut Criterion) {
    let store = Store::new(0usize);

    c.bench_function("store_set", |b| {
        let mut i = 0;
        b.iter(|| {
            store.set(black_box(i));
            i += 1;
        });
    });
}

fn hydrate_benchmark(c: &mut Criterion) {
    let storage = Storage::in_memory();
    PersistentStore::new(state(), "bench", Some(&storage))
        .set(state())
        .unwrap();

    c.bench_function("persistent_hydrate", |b| {
        b.iter(|| black_box(PersistentStore::new(state(), black_box("bench"), Some(&storage))));
    });
}

fn persistent_update_benchmark(c: &mut Criterion) {
    let storage = Storage::in_memory();
    let store = PersistentStore::new(state(), "bench", Some(&storage));

    c.bench_function("persistent_update", |b| {
        b.iter(|| {
            store
                .update(|s| State {
                    counter: black_box(s.counter + 1),
                    name: s.name.clone(),
                })
                .unwrap();
        });
    });
}

fn persistent_subscribe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistent_subscribe");

    for subscriber_count in [1, 10, 100].iter() {
        let storage = Storage::in_memory();
        let store = PersistentStore::new(state(), "bench", Some(&storage));

        let _subs: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                store.subscribe(|_| {
                    // Empty subscriber
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store
                        .set(State {
                            counter: black_box(i),
                            name: "test".to_string(),
                        })
                        .unwrap();
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    store_set_benchmark,
    hydrate_benchmark,
    persistent_update_benchmark,
    persistent_subscribe_benchmark,
);
criterion_main!(benches);
