//! # Transaction-ID cacher
//!
//! Computing a transaction ID recovers the sender, which dominates block
//! import. A process-wide rayon pool fills the ID caches of a batch ahead of
//! use.
//!
//! A batch is split into strided tasks: task `i` of `n` visits
//! `i, i + n, i + 2n, ...` and calls [`Transaction::cal_tx_id`] on each. The
//! tasks run in one pool scope, so [`tx_recover`] returns once all of them
//! have. Stopping drops the pool; a batch already in flight keeps its own
//! handle and completes.

use std::sync::Arc;

use parking_lot::{const_mutex, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::domain::Transaction;
use crate::error::{ModelError, Result};

/// Batches smaller than `threads * SPLIT_FACTOR` run as a single task.
const SPLIT_FACTOR: usize = 10;

static TX_CACHER: Mutex<Option<Arc<ThreadPool>>> = const_mutex(None);

/// Start the pool with `threads` workers. Does nothing when already running.
pub fn start_tx_cacher(threads: usize) -> Result<()> {
    let mut slot = TX_CACHER.lock();
    if slot.is_some() {
        return Ok(());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|id| format!("tx-cacher-{id}"))
        .build()
        .map_err(|e| ModelError::CacherSpawn(e.to_string()))?;

    info!(threads = pool.current_num_threads(), "tx cacher started");
    *slot = Some(Arc::new(pool));
    Ok(())
}

pub fn is_tx_cacher_running() -> bool {
    TX_CACHER.lock().is_some()
}

/// Worker count of the running pool.
pub fn tx_cacher_threads() -> Option<usize> {
    TX_CACHER.lock().as_ref().map(|pool| pool.current_num_threads())
}

/// Fill the ID cache of every transaction in `txs`, blocking until done.
pub fn tx_recover(txs: &[Arc<Transaction>]) -> Result<()> {
    if txs.is_empty() {
        return Ok(());
    }
    let pool = TX_CACHER
        .lock()
        .as_ref()
        .map(Arc::clone)
        .ok_or(ModelError::CacherStopped)?;

    let threads = pool.current_num_threads();
    let tasks = if txs.len() < threads * SPLIT_FACTOR {
        1
    } else {
        threads
    };
    pool.scope(|scope| {
        for start in 0..tasks {
            scope.spawn(move |_| {
                for tx in txs.iter().skip(start).step_by(tasks) {
                    tx.cal_tx_id();
                }
            });
        }
    });

    debug!(tx_count = txs.len(), tasks, "tx ids cached");
    Ok(())
}

/// Stop the pool. Its threads exit once queued work is done.
pub fn stop_tx_cacher() {
    if TX_CACHER.lock().take().is_some() {
        info!("tx cacher stopped");
    }
}
