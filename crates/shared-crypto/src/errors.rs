//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature bytes failed the range, length or parity checks.
    #[error("invalid transaction v, r, s values")]
    InvalidSignature,

    /// Recovered key is not an uncompressed secp256k1 point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Key recovery from a well-formed signature did not produce a point.
    #[error("public key recovery failed")]
    RecoveryFailed,
}
