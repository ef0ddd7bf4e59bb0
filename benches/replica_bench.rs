use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use textsync_core::{
    transform, Operation, Origin, OverlapPolicy, Replica, ReplicaConfig, TextRange, WireMessage,
};

fn pair(text: &str) -> (Replica, Replica) {
    (
        Replica::with_text("input".to_string(), ReplicaConfig::primary(), text),
        Replica::with_text("logic".to_string(), ReplicaConfig::secondary(), text),
    )
}

fn deliver(from: &mut Replica, to: &mut Replica) {
    for msg in from.drain_outgoing() {
        to.receive(msg).unwrap();
    }
}

/// Benchmark a single transform step
fn bench_transform(c: &mut Criterion) {
    let pending = Operation::new(TextRange::new(10, 20), "pending", Origin::Local, 1);
    let shifted = Operation::new(TextRange::new(0, 5), "xy", Origin::Remote, 1);
    let overlapping = Operation::new(TextRange::new(15, 30), "q", Origin::Remote, 1);

    c.bench_function("transform_shift", |b| {
        b.iter(|| black_box(transform(&pending, &shifted, true, OverlapPolicy::default())));
    });
    c.bench_function("transform_overlap", |b| {
        b.iter(|| black_box(transform(&pending, &overlapping, true, OverlapPolicy::default())));
    });
}

/// Benchmark local typing (simulates a user typing with no peer traffic)
fn bench_local_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("replica_local_typing");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut replica = Replica::new("input".to_string(), ReplicaConfig::primary());
                for i in 0..size {
                    black_box(replica.submit_local_edit(i, i, "a").unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark rebasing a deep pending queue over one remote edit
fn bench_remote_over_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("replica_remote_over_pending");

    for depth in [1, 10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut replica =
                        Replica::with_text("input".to_string(), ReplicaConfig::primary(), "abc");
                    for i in 0..depth {
                        replica.submit_local_edit(3 + i, 3 + i, "a").unwrap();
                    }
                    replica
                },
                |mut replica| {
                    replica
                        .receive(WireMessage::Edit {
                            sequence: 1,
                            range_start: 0,
                            range_end: 0,
                            inserted_text: "x".to_string(),
                        })
                        .unwrap();
                    black_box(replica)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark concurrent edits convergence
fn bench_concurrent_convergence(c: &mut Criterion) {
    c.bench_function("replica_concurrent_100_edits_each", |b| {
        b.iter(|| {
            let (mut input, mut logic) = pair("");

            for i in 0..100 {
                input.submit_local_edit(i, i, "a").unwrap();
                logic.submit_local_edit(0, 0, "b").unwrap();
            }

            while input.has_outgoing() || logic.has_outgoing() {
                deliver(&mut input, &mut logic);
                deliver(&mut logic, &mut input);
            }

            // Verify convergence
            assert_eq!(input.text(), logic.text());
        });
    });
}

/// Benchmark JSON frame encoding
fn bench_serialization(c: &mut Criterion) {
    let msg = WireMessage::Edit {
        sequence: 42,
        range_start: 100,
        range_end: 120,
        inserted_text: "a".repeat(64),
    };

    c.bench_function("wire_json_encode", |b| {
        b.iter(|| black_box(textsync_core::protocol::serialize::encode_json(&msg).unwrap()));
    });

    let bytes = textsync_core::protocol::serialize::encode_json(&msg).unwrap();
    c.bench_function("wire_json_decode", |b| {
        b.iter(|| black_box(textsync_core::protocol::serialize::decode_json(&bytes).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_transform,
    bench_local_typing,
    bench_remote_over_pending,
    bench_concurrent_convergence,
    bench_serialization,
);

criterion_main!(benches);
