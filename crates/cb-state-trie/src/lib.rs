//! # cb-state-trie
//!
//! Merkle-Patricia trie used to commit ordered lists (transactions, votes,
//! inter-links) into a single root hash.
//!
//! ## Role in System
//!
//! - **Root derivation**: `derive_sha` inserts every `(key, value)` pair of a
//!   `DerivableList` into a fresh trie and returns the root.
//! - **Ethereum layout**: 16-way branches, hex-prefix paths, Keccak-256 node
//!   hashes, children shorter than 32 bytes embedded in their parent.
//!
//! ```text
//! list ──(key_i, value_i)──→ PatriciaTrie ──root_hash()──→ Hash
//! ```

pub mod domain;

pub use domain::*;
