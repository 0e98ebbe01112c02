//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Core Bloom filter implementation
//! - Keccak-derived hash indices
//! - Sizing configuration
//!
//! RULES:
//! - No I/O operations
//! - Pure functions where possible

pub mod bloom_filter;
pub mod config;
pub mod hash_functions;

pub use bloom_filter::Bloom;
pub use config::{
    derive_config, BloomConfig, InvBloomConfig, DEFAULT_BLOCK_BLOOM_CONFIG,
    DEFAULT_INV_BLOOM_CONFIG, MAX_HASH_COUNT,
};
pub use hash_functions::hash_words;
