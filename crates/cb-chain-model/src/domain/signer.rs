//! Chain-bound transaction signer
//!
//! The signed digest is `keccak256(rlp([body, chain_id]))`. The recovery id
//! `v ∈ {0, 1}` is stored as `v' = v + 54 + 2 · chain_id`, so a signature made
//! for one chain recovers to garbage (and fails the range check) on another.

use rlp::RlpStream;
use shared_crypto::{
    keccak256, normal_address, recover_pubkey, signature_bytes, valid_sig_value, CryptoError,
    PublicKeyBytes,
};
use shared_types::{Address, Hash, U256};
use tracing::debug;

use super::transaction::{Transaction, TxData};

/// Offset added to the recovery id.
pub const V_OFFSET: u64 = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signer {
    chain_id: U256,
}

impl Signer {
    pub fn new(chain_id: impl Into<U256>) -> Self {
        Self {
            chain_id: chain_id.into(),
        }
    }

    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    /// Digest a transaction body is signed over.
    pub fn sign_hash(&self, data: &TxData) -> Hash {
        let mut stream = RlpStream::new_list(2);
        stream.append(data).append(&self.chain_id);
        keccak256(&stream.out())
    }

    /// Split a 65-byte `r ‖ s ‖ v` signature into stored witness values.
    pub fn signature_values(&self, sig: &[u8; 65]) -> (U256, U256, U256) {
        let r = U256::from_big_endian(&sig[..32]);
        let s = U256::from_big_endian(&sig[32..64]);
        let mut v = U256::from(sig[64]) + U256::from(V_OFFSET);
        if !self.chain_id.is_zero() {
            v = v.saturating_add(self.chain_id.saturating_mul(U256::from(2)));
        }
        (r, s, v)
    }

    /// Recover the uncompressed public key that signed `tx` under this chain.
    pub fn sender_public_key(&self, tx: &Transaction) -> Result<PublicKeyBytes, CryptoError> {
        let witness = tx.witness();
        let v = witness
            .v
            .checked_sub(self.chain_id.saturating_mul(U256::from(2)))
            .and_then(|v| v.checked_sub(U256::from(V_OFFSET)))
            .ok_or(CryptoError::InvalidSignature)?;

        if v.bits() > 8 {
            debug!(v = %witness.v, "recovery id does not fit a byte");
            return Err(CryptoError::InvalidSignature);
        }
        if !valid_sig_value(&witness.r, &witness.s, &v) {
            debug!("signature values out of range");
            return Err(CryptoError::InvalidSignature);
        }

        let sig = signature_bytes(&witness.r, &witness.s, v.low_u32() as u8);
        let public_key = recover_pubkey(&self.sign_hash(tx.data()), &sig)?;
        if public_key[0] != 0x04 {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(public_key)
    }

    /// Recover the normal address that signed `tx` under this chain.
    pub fn sender(&self, tx: &Transaction) -> Result<Address, CryptoError> {
        self.sender_public_key(tx).map(|key| normal_address(&key))
    }
}

/// Chain id implied by a stored `v'`: `(v' - 54) / 2`.
pub fn derive_chain_id(v: &U256) -> U256 {
    v.saturating_sub(U256::from(V_OFFSET)) / U256::from(2)
}
