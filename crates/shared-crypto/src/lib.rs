//! # Shared Crypto - Chain Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Block hashes, transaction ids, trie nodes |
//! | `ecdsa` | secp256k1 | Recoverable transaction and vote signatures |
//! | `address` | Keccak-256 | Typed address derivation |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization
//! - Secret key bytes are zeroized when a keypair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use address::{contract_address, lock_address, normal_address};
pub use ecdsa::{recover_pubkey, signature_bytes, valid_sig_value, PublicKeyBytes, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, rlp_hash, KeccakHasher};
