//! Criterion benchmarks for reconciliation.
//!
//! Each snapshot holds a list of records with nested fields; the next
//! snapshot changes a few records and reorders the list.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::{json, Value};
use sharetree_core::{Node, Reconciler};

fn records(count: usize, changed_every: usize, rotate: usize) -> Value {
    let mut items: Vec<Value> = (0..count)
        .map(|i| {
            let revision = if changed_every > 0 && i % changed_every == 0 { 2 } else { 1 };
            json!({
                "id": i + 1,
                "name": format!("record-{}", i),
                "revision": revision,
                "tags": ["alpha", "beta"],
                "owner": { "team": "core", "seat": i % 7 },
            })
        })
        .collect();
    items.rotate_left(rotate % count.max(1));
    json!({ "page": 1, "items": items })
}

fn bench_reconcile(c: &mut Criterion) {
    let reconciler = Reconciler::new();

    for count in [100usize, 1000] {
        let previous = Node::from(records(count, 0, 0));

        c.bench_function(&format!("reconcile_unchanged_{}", count), |bench| {
            bench.iter_batched(
                || Node::from(records(count, 0, 0)),
                |next| reconciler.reconcile(Some(&previous), next, None),
                BatchSize::SmallInput,
            )
        });

        c.bench_function(&format!("reconcile_changed_and_rotated_{}", count), |bench| {
            bench.iter_batched(
                || Node::from(records(count, 10, 3)),
                |next| reconciler.reconcile(Some(&previous), next, None),
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
