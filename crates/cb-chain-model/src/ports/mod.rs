//! Ports layer.
//!
//! - Inbound (driving) ports: checks other components run against this model
//! - Outbound (driven) ports: chain state this crate reads but does not own

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
