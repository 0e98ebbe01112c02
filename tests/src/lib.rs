//! # Cobalt Chain Test Suite
//!
//! Cross-crate tests for the chain model.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs     # Deterministic keys, transactions, headers
//! │   └── integration/    # Scenarios spanning the model, trie and bloom crates
//! └── benches/            # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cb-tests
//! cargo test -p cb-tests integration::scenarios
//! cargo bench -p cb-tests
//! ```

pub mod fixtures;
pub mod integration;
