//! # Chain Model Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | header | block hash (nonce splice) |
//! | transaction | sender recovery and ID, sequential vs cacher |
//! | roots | trie root over transaction lists |
//! | merkle | branch construction at the leaf limit |
//! | bloom | block bloom, sequential vs work map |

use std::sync::Arc;

use cb_chain_model::{
    merkle_computation, start_tx_cacher, stop_tx_cacher, transactions_root, tx_recover, Block,
    Transaction, MAX_ROUTE_NUMBER,
};
use cb_tests::fixtures::{alice, header, signed_batch, signed_transfer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::Hash;

// Copies without any cached ID or sender
fn uncached(txs: &[Arc<Transaction>]) -> Vec<Arc<Transaction>> {
    txs.iter()
        .map(|tx| Arc::new(Transaction::from_parts(tx.data().clone(), tx.witness().clone())))
        .collect()
}

fn bench_header(c: &mut Criterion) {
    let h = header(1_000);
    c.bench_function("header/hash", |b| b.iter(|| black_box(h.hash())));
}

fn bench_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction");

    let tx = signed_transfer(&alice(), 1, 0);
    group.bench_function("sender_and_id", |b| {
        b.iter(|| {
            let fresh = Transaction::from_parts(tx.data().clone(), tx.witness().clone());
            black_box(fresh.cal_tx_id())
        })
    });

    let batch = signed_batch(&alice(), 1, 500);
    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("ids_sequential/500", |b| {
        b.iter_with_setup(
            || uncached(&batch),
            |txs| {
                for tx in &txs {
                    black_box(tx.cal_tx_id());
                }
            },
        )
    });

    if start_tx_cacher(4).is_ok() {
        group.bench_function("ids_cacher/500", |b| {
            b.iter_with_setup(|| uncached(&batch), |txs| tx_recover(&txs))
        });
        stop_tx_cacher();
    }
    group.finish();
}

fn bench_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("roots");
    for size in [10u64, 100, 1_000] {
        let txs = signed_batch(&alice(), 1, size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("transactions_root", size), &txs, |b, txs| {
            b.iter(|| black_box(transactions_root(txs)))
        });
    }
    group.finish();
}

fn bench_merkle(c: &mut Criterion) {
    let leaves: Vec<Hash> = signed_batch(&alice(), 1, MAX_ROUTE_NUMBER as u64)
        .iter()
        .map(|tx| tx.cal_tx_id())
        .collect();
    c.bench_function("merkle/branch_32", |b| {
        b.iter(|| {
            let mut mutated = false;
            black_box(merkle_computation(&leaves, 17, Some(&mut mutated)))
        })
    });
}

fn bench_bloom(c: &mut Criterion) {
    let mut group = c.benchmark_group("bloom");
    let txs: Vec<Transaction> = signed_batch(&alice(), 1, 2_000)
        .iter()
        .map(|tx| Transaction::clone(tx))
        .collect();
    let block = Block::new(&header(2), txs, vec![]);
    block.get_block_txs_bloom();

    group.bench_function("sequential/2000", |b| {
        b.iter(|| black_box(block.get_block_txs_bloom()))
    });
    group.bench_function("work_map/2000", |b| {
        b.iter(|| black_box(block.encode_txs_bloom(100)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_header,
    bench_transaction,
    bench_roots,
    bench_merkle,
    bench_bloom,
);

criterion_main!(benches);
