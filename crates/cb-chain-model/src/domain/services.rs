//! Domain services over transactions.
//!
//! Admission checks against chain state and set difference by transaction ID.

use std::collections::HashSet;
use std::sync::Arc;

use cb_telemetry::log_tx_event;
use shared_types::AddressType;

use super::signer::Signer;
use super::transaction::{intrinsic_gas, Transaction};
use crate::error::{ModelError, Result};
use crate::ports::{ChainStateReader, TxValidator};
use crate::SUBSYSTEM;

/// Transactions of `a` whose ID does not appear in `b`, in `a`'s order.
pub fn tx_difference(a: &[Arc<Transaction>], b: &[Arc<Transaction>]) -> Vec<Arc<Transaction>> {
    let known: HashSet<_> = b.iter().map(|tx| tx.cal_tx_id()).collect();
    a.iter()
        .filter(|tx| !known.contains(&tx.cal_tx_id()))
        .cloned()
        .collect()
}

/// Checks a transaction against the state behind `R`.
///
/// Rejections, in the order they are tried:
/// 1. sender not recoverable for this chain
/// 2. recipient tag not routed
/// 3. gas limit below intrinsic gas
/// 4. nonce behind the account nonce
/// 5. balance below `gas_price * gas_limit + amount`
pub struct StateTxValidator<R: ChainStateReader> {
    state: R,
    signer: Signer,
}

impl<R: ChainStateReader> StateTxValidator<R> {
    pub fn new(state: R, signer: Signer) -> Self {
        Self { state, signer }
    }

    pub fn state(&self) -> &R {
        &self.state
    }
}

impl<R: ChainStateReader> TxValidator for StateTxValidator<R> {
    fn valid(&self, tx: &Transaction) -> Result<()> {
        let from = tx.sender(Some(&self.signer))?;

        if let kind @ AddressType::Unknown(_) = tx.tx_type() {
            return Err(ModelError::UnknownRecipientType(kind));
        }

        let want = intrinsic_gas(tx.extra_data(), tx.is_contract_creation())?;
        if tx.gas_limit() < want {
            return Err(ModelError::IntrinsicGasTooLow {
                have: tx.gas_limit(),
                want,
            });
        }

        let state_nonce = self.state.account_nonce(&from)?;
        if tx.nonce() < state_nonce {
            return Err(ModelError::NonceTooLow {
                address: from,
                state: state_nonce,
                tx: tx.nonce(),
            });
        }

        let balance = self.state.account_balance(&from)?;
        let cost = tx.cost();
        if balance < cost {
            return Err(ModelError::InsufficientBalance {
                address: from,
                balance,
                cost,
            });
        }

        log_tx_event!(
            debug,
            SUBSYSTEM,
            "transaction admitted",
            tx.cal_tx_id(),
            sender = %from,
            nonce = tx.nonce(),
            height = self.state.current_block_number()
        );
        Ok(())
    }
}
