//! # Cobalt Telemetry
//!
//! Log setup shared by every Cobalt crate.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cb_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("logger already installed");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CB_SERVICE_NAME` | `cobalt-chain` | Service name in logs |
//! | `CB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CB_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `CB_NETWORK` | `testnet` | Network name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
