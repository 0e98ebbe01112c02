//! Shared builders for tests and benchmarks.
//!
//! Keys come from fixed bytes so every address is reproducible.

use std::sync::Arc;

use cb_chain_model::{Header, Signer, Transaction};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, AddressType, BlockNonce, Difficulty, Hash, U256};

pub fn alice() -> Secp256k1KeyPair {
    Secp256k1KeyPair::from_bytes([0xa1; 32]).expect("valid test key")
}

pub fn bob() -> Secp256k1KeyPair {
    Secp256k1KeyPair::from_bytes([0xb0; 32]).expect("valid test key")
}

pub fn normal_address(byte: u8) -> Address {
    Address::with_type(AddressType::Normal, &[byte; 20])
}

/// Transfer of `amount` to a fixed recipient at gas price 1.
pub fn transfer(nonce: u64, amount: u64, gas_limit: u64) -> Transaction {
    Transaction::new(
        nonce,
        normal_address(0x42),
        U256::from(amount),
        U256::one(),
        gas_limit,
        vec![],
    )
}

pub fn signed_transfer(key: &Secp256k1KeyPair, chain_id: u64, nonce: u64) -> Transaction {
    transfer(nonce, 10, 21_000)
        .sign(key, &Signer::new(chain_id))
        .expect("signing succeeds")
}

pub fn signed_batch(key: &Secp256k1KeyPair, chain_id: u64, count: u64) -> Vec<Arc<Transaction>> {
    (0..count)
        .map(|nonce| Arc::new(signed_transfer(key, chain_id, nonce)))
        .collect()
}

/// A mined-looking header at `number`.
pub fn header(number: u64) -> Header {
    Header::new(
        1,
        number,
        Hash([0x11; 32]),
        Hash([0x22; 32]),
        Difficulty::from_compact(0x1fff_ffff),
        U256::from(1_600_000_000u64) * U256::from(1_000_000_000u64),
        normal_address(0xcb),
        BlockNonce::from_u64(7),
    )
}
