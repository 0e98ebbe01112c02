//! # Integration Tests
//!
//! | Module | Covers |
//! |--------|--------|
//! | `scenarios` | fees, chain-bound signing, nonce-free hash, retarget, inter-link, halted votes |
//! | `codec` | binary and JSON round trips preserving hashes and IDs |
//! | `merkle` | branch construction over transaction IDs |
//! | `pool` | ordering, admission, ID caching and set difference over one batch |

pub mod codec;
pub mod merkle;
pub mod pool;
pub mod scenarios;
