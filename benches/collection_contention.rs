use std::sync::{Arc, Mutex};
use std::thread;

use biblioteca::collection::{ChangeEvent, SharedCollection};
use biblioteca::observers::Result;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const NUM_THREADS: usize = 8;
const ITERATIONS_PER_THREAD: usize = 10_000;

fn bench_shared_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_add_and_snapshot");

    for observers in [0usize, 1, 8] {
        group.bench_function(
            BenchmarkId::new(
                format!("SharedCollection ({} observers)", observers),
                format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
            ),
            |b| {
                b.iter(|| {
                    let collection = Arc::new(SharedCollection::<usize>::new());
                    for _ in 0..observers {
                        collection.subscribe(Arc::new(|event: &ChangeEvent<usize>| -> Result<()> {
                            black_box(event.item());
                            Ok(())
                        }));
                    }

                    let mut handles = vec![];
                    for t in 0..NUM_THREADS {
                        let collection = Arc::clone(&collection);
                        let handle = thread::spawn(move || {
                            for j in 0..ITERATIONS_PER_THREAD {
                                collection.add(t * ITERATIONS_PER_THREAD + j);
                                if j % 100 == 0 {
                                    black_box(collection.snapshot());
                                }
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(collection.len())
                })
            },
        );
    }

    group.bench_function(
        BenchmarkId::new(
            "Mutex<Vec> (no notification)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let items = Arc::new(Mutex::new(Vec::new()));
                let mut handles = vec![];

                for t in 0..NUM_THREADS {
                    let items = Arc::clone(&items);
                    let handle = thread::spawn(move || {
                        for j in 0..ITERATIONS_PER_THREAD {
                            items.lock().unwrap().push(t * ITERATIONS_PER_THREAD + j);
                            if j % 100 == 0 {
                                black_box(items.lock().unwrap().clone());
                            }
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(items.lock().unwrap().len())
            })
        },
    );

    group.finish();
}

criterion_group!(benches, bench_shared_collection);
criterion_main!(benches);
