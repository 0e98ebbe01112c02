//! # Keccak-256 Hashing
//!
//! Every digest on the chain is Keccak-256 (the pre-standard SHA-3 padding
//! used by Ethereum), either over raw bytes or over a canonical RLP encoding.

use rlp::Encodable;
use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Stateful Keccak-256 hasher.
pub struct KeccakHasher {
    inner: Keccak256,
}

impl KeccakHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        Hash(self.inner.finalize().into())
    }
}

impl Default for KeccakHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Hash(Keccak256::digest(data).into())
}

/// Hash the concatenation of several inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = KeccakHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Keccak-256 of the canonical RLP encoding of `value`.
pub fn rlp_hash<T: Encodable>(value: &T) -> Hash {
    keccak256(&rlp::encode(value))
}
