//! Inbound (driving) ports.

use crate::domain::Transaction;
use crate::error::Result;

/// Admission check a transaction pool runs before accepting a transaction.
pub trait TxValidator: Send + Sync {
    fn valid(&self, tx: &Transaction) -> Result<()>;
}
