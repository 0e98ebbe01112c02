//! Hash indices for the bloom filter
//!
//! All indices come from one Keccak-256 digest of the key: the i-th index is
//! the i-th big-endian 32-bit word, so at most eight are available.

use shared_crypto::keccak256;

/// The first `k` raw index words of `key`, before masking to the filter size.
pub fn hash_words(key: &[u8], k: u32) -> Vec<u32> {
    let digest = keccak256(key);
    digest
        .0
        .chunks_exact(4)
        .take(k as usize)
        .map(|word| u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
        .collect()
}
