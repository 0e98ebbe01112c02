//! Chain parameters consumed by the model.
//!
//! Everything the retarget curve, signer and block bloom read lives here so
//! callers pass one value instead of reaching for globals.

use std::env;
use std::str::FromStr;

use shared_types::{Address, Difficulty, U256};

use crate::error::{ModelError, Result};

/// Default chain identifier folded into transaction signatures.
pub const DEFAULT_CHAIN_ID: u64 = 1601;

/// Height from which every block uses the fixed show difficulty.
pub const DEFAULT_SHOW_HEIGHT: u64 = 850_893;

/// Compact form of the show difficulty.
pub const SHOW_DIFFICULTY_COMPACT: u32 = 0x1e00_ffff;

/// Compact form of the target used when difficulty validation is off.
pub const TEST_DIFFICULTY_COMPACT: u32 = 0x1fff_ffff;

/// Chain model configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainModelConfig {
    /// Chain identifier `C` used by the transaction signer
    pub chain_id: u64,

    /// Target seconds between blocks
    pub block_generate: u64,

    /// Blocks per retarget period
    pub block_count_of_period: u64,

    /// Easiest target a retarget may produce
    pub main_pow_limit: U256,

    /// Height from which `show_difficulty` is used unconditionally
    pub show_height: u64,

    /// Fixed difficulty at and above `show_height`
    pub show_difficulty: Difficulty,

    /// Skip retargeting and use the fixed test target
    pub ignore_difficulty_validation: bool,

    /// Addresses allowed to cast boot-node votes
    pub verifier_boot_nodes: Vec<Address>,

    /// Transaction count above which the block bloom is built in parallel
    pub default_txs: usize,

    /// Worker threads of the transaction-ID cacher
    pub tx_cacher_threads: usize,
}

impl Default for ChainModelConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            block_generate: 13,
            block_count_of_period: 4096,
            main_pow_limit: (U256::one() << 253usize) - U256::one(),
            show_height: DEFAULT_SHOW_HEIGHT,
            show_difficulty: Difficulty::from_compact(SHOW_DIFFICULTY_COMPACT),
            ignore_difficulty_validation: false,
            verifier_boot_nodes: Vec::new(),
            default_txs: 100,
            tx_cacher_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl ChainModelConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CB_CHAIN_ID`: Chain identifier (default: 1601)
    /// - `CB_BLOCK_GENERATE`: Seconds per block (default: 13)
    /// - `CB_BLOCK_COUNT_OF_PERIOD`: Retarget period (default: 4096)
    /// - `CB_SHOW_HEIGHT`: Fixed-difficulty height (default: 850893)
    /// - `CB_IGNORE_DIFFICULTY`: Use the test target (default: false)
    /// - `CB_VERIFIER_BOOT_NODES`: Comma-separated hex addresses
    /// - `CB_DEFAULT_TXS`: Parallel bloom threshold (default: 100)
    /// - `CB_TX_CACHER_THREADS`: Cacher workers (default: available cores)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ChainModelConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            chain_id: parse_or(&lookup, "CB_CHAIN_ID", defaults.chain_id)?,
            block_generate: parse_or(&lookup, "CB_BLOCK_GENERATE", defaults.block_generate)?,
            block_count_of_period: parse_or(
                &lookup,
                "CB_BLOCK_COUNT_OF_PERIOD",
                defaults.block_count_of_period,
            )?,
            show_height: parse_or(&lookup, "CB_SHOW_HEIGHT", defaults.show_height)?,
            ignore_difficulty_validation: lookup("CB_IGNORE_DIFFICULTY")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.ignore_difficulty_validation),
            verifier_boot_nodes: match lookup("CB_VERIFIER_BOOT_NODES") {
                Some(list) => parse_addresses(&list)?,
                None => defaults.verifier_boot_nodes.clone(),
            },
            default_txs: parse_or(&lookup, "CB_DEFAULT_TXS", defaults.default_txs)?,
            tx_cacher_threads: parse_or(
                &lookup,
                "CB_TX_CACHER_THREADS",
                defaults.tx_cacher_threads,
            )?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the retarget curve or cacher cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.block_count_of_period == 0 {
            return Err(ModelError::Config("block_count_of_period must be > 0".into()));
        }
        if self.block_generate == 0 {
            return Err(ModelError::Config("block_generate must be > 0".into()));
        }
        if self.tx_cacher_threads == 0 {
            return Err(ModelError::Config("tx_cacher_threads must be > 0".into()));
        }
        Ok(())
    }

    pub fn is_boot_node(&self, address: &Address) -> bool {
        self.verifier_boot_nodes.contains(address)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ModelError::Config(format!("{key}={raw}: {e}"))),
        None => Ok(default),
    }
}

fn parse_addresses(list: &str) -> Result<Vec<Address>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Address>()
                .map_err(|e| ModelError::Config(format!("boot node {s}: {e}")))
        })
        .collect()
}
