//! Outbound (driven) ports.

use shared_types::{Address, U256};

use crate::error::Result;

/// Read-only view of the chain state that pending transactions are checked
/// against. Implemented by the state database.
pub trait ChainStateReader: Send + Sync {
    /// Height of the current head block.
    fn current_block_number(&self) -> u64;

    /// Next nonce expected from `address`.
    fn account_nonce(&self, address: &Address) -> Result<u64>;

    fn account_balance(&self, address: &Address) -> Result<U256>;
}

/// In-memory state for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MockChainState {
    pub height: u64,
    pub nonces: std::collections::HashMap<Address, u64>,
    pub balances: std::collections::HashMap<Address, U256>,
}

#[cfg(test)]
impl MockChainState {
    pub fn with_account(mut self, address: Address, nonce: u64, balance: U256) -> Self {
        self.nonces.insert(address, nonce);
        self.balances.insert(address, balance);
        self
    }
}

#[cfg(test)]
impl ChainStateReader for MockChainState {
    fn current_block_number(&self) -> u64 {
        self.height
    }

    fn account_nonce(&self, address: &Address) -> Result<u64> {
        Ok(self.nonces.get(address).copied().unwrap_or_default())
    }

    fn account_balance(&self, address: &Address) -> Result<U256> {
        Ok(self.balances.get(address).copied().unwrap_or_default())
    }
}
