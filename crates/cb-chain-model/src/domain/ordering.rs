//! Fee-ordered, nonce-honouring iteration over pending transactions.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;

use shared_types::{Address, U256};
use tracing::warn;

use super::signer::Signer;
use super::transaction::Transaction;

/// Head transaction of one account in the price heap.
struct Head {
    gas_price: U256,
    sender: Address,
    tx: Arc<Transaction>,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on price; sender breaks ties so iteration is deterministic
        self.gas_price
            .cmp(&other.gas_price)
            .then_with(|| other.sender.cmp(&self.sender))
    }
}

/// Transactions grouped by sender, yielded by descending gas price while each
/// sender's transactions stay in nonce order.
pub struct TransactionsByFeeAndNonce {
    txs: HashMap<Address, VecDeque<Arc<Transaction>>>,
    heads: BinaryHeap<Head>,
    signer: Signer,
}

impl TransactionsByFeeAndNonce {
    /// `txs` maps each sender to its nonce-sorted transactions. An account
    /// whose first transaction does not recover to its key is dropped.
    pub fn new(signer: Signer, txs: HashMap<Address, Vec<Arc<Transaction>>>) -> Self {
        let mut pending = HashMap::with_capacity(txs.len());
        let mut heads = BinaryHeap::with_capacity(txs.len());

        for (from, account_txs) in txs {
            let mut queue: VecDeque<_> = account_txs.into();
            let Some(first) = queue.pop_front() else {
                continue;
            };
            match first.sender(Some(&signer)) {
                Ok(sender) if sender == from => {
                    heads.push(Head {
                        gas_price: first.gas_price(),
                        sender,
                        tx: first,
                    });
                    pending.insert(from, queue);
                }
                _ => {
                    warn!(from = %from, "the tx sender and from is different");
                }
            }
        }

        Self {
            txs: pending,
            heads,
            signer,
        }
    }

    /// Best remaining transaction.
    pub fn peek(&self) -> Option<&Arc<Transaction>> {
        self.heads.peek().map(|head| &head.tx)
    }

    /// Replace the best head with the next transaction of the same account.
    pub fn shift(&mut self) {
        let Some(head) = self.heads.pop() else {
            return;
        };
        let next = self
            .txs
            .get_mut(&head.sender)
            .and_then(VecDeque::pop_front);
        if let Some(tx) = next {
            self.heads.push(Head {
                gas_price: tx.gas_price(),
                sender: head.sender,
                tx,
            });
        }
    }

    /// Drop the best head without replacing it; the rest of that account is
    /// skipped.
    pub fn pop(&mut self) {
        if let Some(head) = self.heads.pop() {
            self.txs.remove(&head.sender);
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}
