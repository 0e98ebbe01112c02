//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures over 32-byte prehashes.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization, recovery id flipped to match
//! - `valid_sig_value` enforces `1 <= r < n`, `1 <= s <= n/2`, `v in {0, 1}`
//!
//! Signatures travel as 65 bytes `r ‖ s ‖ v`.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use primitive_types::U256;
use shared_types::{Address, Hash};
use zeroize::Zeroize;

use crate::address::normal_address;
use crate::CryptoError;

/// Uncompressed public key, `0x04 ‖ x ‖ y`.
pub type PublicKeyBytes = [u8; 65];

/// secp256k1 curve order n.
pub const SECP256K1_N: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// n / 2, the largest accepted `s`.
pub const SECP256K1_HALF_N: U256 = U256([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

/// secp256k1 ECDSA keypair.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Uncompressed public key (65 bytes).
    pub fn public_key(&self) -> PublicKeyBytes {
        encode_uncompressed(self.signing_key.verifying_key())
    }

    /// Normal-type address of this key.
    pub fn address(&self) -> Address {
        normal_address(&self.public_key())
    }

    /// Sign a 32-byte prehash, returning `r ‖ s ‖ v` with `v in {0, 1}`.
    pub fn sign_recoverable(&self, prehash: &Hash) -> Result<[u8; 65], CryptoError> {
        let (mut sig, mut recid) = self
            .signing_key
            .sign_prehash_recoverable(prehash.as_bytes())
            .map_err(|_| CryptoError::InvalidSignature)?;
        if let Some(normalized) = sig.normalize_s() {
            sig = normalized;
            recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
        }

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte();
        Ok(out)
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Range check on signature values before recovery.
pub fn valid_sig_value(r: &U256, s: &U256, v: &U256) -> bool {
    if r.is_zero() || s.is_zero() {
        return false;
    }
    if *s > SECP256K1_HALF_N {
        return false;
    }
    *r < SECP256K1_N && *s < SECP256K1_N && *v <= U256::one()
}

/// Recovers the uncompressed public key that produced `signature` over `prehash`.
pub fn recover_pubkey(prehash: &Hash, signature: &[u8; 65]) -> Result<PublicKeyBytes, CryptoError> {
    let recid = RecoveryId::from_byte(signature[64]).ok_or(CryptoError::InvalidSignature)?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| CryptoError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recid)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    let encoded = encode_uncompressed(&key);
    if encoded[0] != 0x04 {
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(encoded)
}

/// Packs `(r, s, v)` into the 65-byte recoverable form.
pub fn signature_bytes(r: &U256, s: &U256, v: u8) -> [u8; 65] {
    let mut out = [0u8; 65];
    r.to_big_endian(&mut out[..32]);
    s.to_big_endian(&mut out[32..64]);
    out[64] = v;
    out
}

fn encode_uncompressed(key: &VerifyingKey) -> PublicKeyBytes {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}
