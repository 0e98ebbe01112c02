//! # Shared Types Crate
//!
//! Fixed-width chain primitives used by every Cobalt crate.
//!
//! ## Design Principles
//!
//! - **One width per type**: `Hash` is 32 bytes, `Address` 22, `Difficulty`
//!   32 and `BlockNonce` 8. Decoding rejects any other length.
//! - **One canonical form**: RLP byte strings for hashing, `0x`-prefixed hex
//!   for the JSON surface.

pub mod entities;
pub mod errors;
pub mod serde_hex;

pub use entities::*;
pub use errors::*;
