use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use relayq::{QueueEngine, QueueRegistry};

/// Benchmark: enqueue cost with an existing backlog of varying depth
fn bench_enqueue_at_depth(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("enqueue_at_depth");

    for depth in [0usize, 1_000, 100_000].iter() {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let engine = rt.block_on(async {
                let engine = QueueEngine::new("bench");
                for i in 0..depth {
                    engine.enqueue(i.to_string()).await;
                }
                engine
            });

            // Only the enqueues are timed; draining keeps the depth constant.
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let start = Instant::now();
                        for _ in 0..1000 {
                            engine.enqueue(black_box("payload")).await;
                        }
                        total += start.elapsed();

                        for _ in 0..1000 {
                            engine.dequeue_within(Some(Duration::from_secs(1))).await;
                        }
                    }
                    total
                })
            });
        });
    }
    group.finish();
}

/// Benchmark: enqueue followed by dequeue on a single task
fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("round_trip");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("enqueue_then_dequeue", |b| {
        let engine = rt.block_on(async { QueueEngine::new("bench") });

        b.iter(|| {
            rt.block_on(async {
                for _ in 0..1000 {
                    engine.enqueue("payload").await;
                    let value = engine.dequeue_within(Some(Duration::from_secs(1))).await;
                    black_box(value);
                }
            })
        });
    });
    group.finish();
}

/// Benchmark: concurrent producers and consumers through the registry
fn bench_concurrent_producers_consumers(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("concurrent");

    for workers in [1usize, 4, 8].iter() {
        group.throughput(Throughput::Elements((workers * 500) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            b.iter(|| {
                rt.block_on(async {
                    let registry = Arc::new(QueueRegistry::new());
                    let mut handles = Vec::with_capacity(workers * 2);

                    for _ in 0..workers {
                        let registry = registry.clone();
                        handles.push(tokio::spawn(async move {
                            for i in 0..500 {
                                registry.enqueue("shared", i.to_string()).await;
                            }
                        }));
                    }

                    for _ in 0..workers {
                        let registry = registry.clone();
                        handles.push(tokio::spawn(async move {
                            for _ in 0..500 {
                                let value = registry
                                    .dequeue_within("shared", Some(Duration::from_secs(5)))
                                    .await;
                                black_box(value);
                            }
                        }));
                    }

                    for handle in handles {
                        handle.await.unwrap();
                    }
                })
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_enqueue_at_depth,
    bench_round_trip,
    bench_concurrent_producers_consumers
);
criterion_main!(benches);
