//! # Chain Model
//!
//! Blocks, transactions and verifier votes of a proof-of-stake / PBFT chain,
//! with the canonical encodings and digests every node must agree on.
//!
//! ## Identities
//!
//! | Value | Identity |
//! |-------|----------|
//! | Header / Block | `keccak256(rlp(header, nonce zeroed) ‖ nonce)` |
//! | Transaction | `keccak256(rlp([tx data, sender]))` |
//! | Vote | `keccak256(rlp(vote without witness))` |
//! | Transaction set | Patricia-trie root keyed by transaction ID (`cb-state-trie`) |
//! | Vote / inter-link set | Patricia-trie root keyed by `rlp(index)` |
//!
//! Transaction signatures are bound to a chain id: the stored recovery value
//! is `v + 54 + 2 · chain_id`, so a signature recovers only on its own chain.
//!
//! ## Module Structure
//!
//! ```text
//! domain/      values and pure computations (block, tx, vote, merkle, ...)
//! ports/       ChainStateReader (driven), TxValidator (driving)
//! decoder      BlockDecoder with a swappable BodyDecoder
//! json         text encoding with named missing-field errors
//! work_map     serialised rayon pass over a transaction slice
//! tx_cacher    process-wide worker pool that pre-computes transaction ids
//! config       ChainModelConfig, from defaults or CB_* environment variables
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use cb_chain_model::{Block, Header};
//! use cb_state_trie::EMPTY_TRIE_ROOT;
//!
//! let block = Block::new(&Header::default(), vec![], vec![]);
//! assert_eq!(block.tx_count(), 0);
//! assert_eq!(block.tx_root(), EMPTY_TRIE_ROOT);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod decoder;
pub mod domain;
pub mod error;
pub mod json;
pub mod ports;
pub mod tx_cacher;
pub mod work_map;

/// `subsystem` field of structured log events.
pub(crate) const SUBSYSTEM: &str = "chain-model";

pub use config::ChainModelConfig;
pub use decoder::{BlockDecoder, BodyDecoder, GenericBodyDecoder, PbftBodyDecoder};
pub use domain::*;
pub use error::{ModelError, Result};
pub use ports::{ChainStateReader, TxValidator};
pub use tx_cacher::{start_tx_cacher, stop_tx_cacher, tx_recover};
pub use work_map::{run_work_map, WorkOperation};
