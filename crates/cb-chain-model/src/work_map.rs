//! Parallel per-transaction work.
//!
//! A [`WorkOperation`] is applied to every transaction of a slice on the
//! rayon pool. Passes are serialised: a second caller waits for the first to
//! finish.

use std::sync::Arc;

use parking_lot::{const_mutex, Mutex};
use rayon::prelude::*;
use tracing::debug;

use crate::domain::Transaction;
use crate::error::{ModelError, Result};

static WORK_MAP_LOCK: Mutex<()> = const_mutex(());

/// Work applied to one transaction. Implementations own whatever shared
/// state they update and synchronise it themselves.
pub trait WorkOperation: Sync {
    fn do_task(&self, tx: &Transaction) -> Result<()>;
}

/// Run `op` over `txs` in parallel. Fails with [`ModelError::EmptyWorkMap`]
/// on an empty slice and with the first task error otherwise.
pub fn run_work_map(op: &dyn WorkOperation, txs: &[Arc<Transaction>]) -> Result<()> {
    if txs.is_empty() {
        return Err(ModelError::EmptyWorkMap);
    }
    let _guard = WORK_MAP_LOCK.lock();
    debug!(tx_count = txs.len(), "running work map");
    txs.par_iter().try_for_each(|tx| op.do_task(tx))
}
