//! # CB Bloom Filters
//!
//! Membership filters over transaction ids, carried in block headers and
//! derived per block for set reconciliation.
//!
//! ## Layout
//!
//! - `Bloom`: the filter, with a big-endian bit layout so its raw bytes are
//!   identical across peers
//! - `BloomConfig`: byte length (power of two) and hash count
//! - `derive_config`: sizing proposal of about 30 bits per element
//!
//! ## Invariants
//!
//! - No false negatives: if a key was digested, `lookup` returns true
//! - Indices are successive 32-bit words of `keccak256(key)`, masked to the
//!   bit length
//!
//! ## Usage Example
//!
//! ```
//! use cb_bloom_filters::{derive_config, Bloom};
//!
//! let mut bloom = Bloom::new(derive_config(2));
//! bloom.digest(b"tx-a").digest(b"tx-b");
//! assert!(bloom.lookup(b"tx-a"));
//! ```

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::FilterError;
