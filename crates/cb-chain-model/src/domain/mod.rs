//! # Domain Layer
//!
//! Chain values and the pure computations over them.
//!
//! ## Components
//!
//! - `header`, `body`, `block`: block structure, roots and hash caches
//! - `transaction`, `signer`, `ordering`: transactions, chain-bound signing
//!   and fee ordering
//! - `vote`, `verification`, `proofs`: verifier votes and equivocation proofs
//! - `interlink`, `merkle`: light-client links and Merkle branches
//! - `difficulty`, `priority`: retargeting and election scoring
//! - `receipt`, `message`: execution results and the VM input view
//! - `services`: admission checks and transaction set difference

pub mod block;
pub mod body;
pub mod difficulty;
pub mod header;
pub mod interlink;
pub mod merkle;
pub mod message;
pub mod ordering;
pub mod priority;
pub mod proofs;
pub mod receipt;
pub mod services;
pub mod signer;
pub mod transaction;
pub mod verification;
pub mod vote;

pub use block::*;
pub use body::*;
pub use difficulty::*;
pub use header::*;
pub use interlink::*;
pub use merkle::*;
pub use message::*;
pub use ordering::*;
pub use priority::*;
pub use proofs::*;
pub use receipt::*;
pub use services::*;
pub use signer::*;
pub use transaction::*;
pub use verification::*;
pub use vote::*;
