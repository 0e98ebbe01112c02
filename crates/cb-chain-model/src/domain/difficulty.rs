//! Proof-of-work retargeting
//!
//! The target is recomputed once per period from the time the period took:
//! `new = old * actual / expected`, with `actual` clamped to a factor of four
//! either way and the result capped at the easiest allowed target. The result
//! is rounded through the 4-byte compact form every node stores.

use shared_types::{Difficulty, U256, U512};
use tracing::{debug, info, warn};

use super::header::Header;
use crate::config::{ChainModelConfig, TEST_DIFFICULTY_COMPACT};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// First block number of the period holding `current`.
pub fn last_period_block_num(period: u64, current: u64) -> u64 {
    current / period * period
}

/// Difficulty of the block after `current_number`.
///
/// `pre_span` opens the period being measured and `last_normal` is the latest
/// mined (non-special) block.
pub fn new_work_diff(
    config: &ChainModelConfig,
    pre_span: &Header,
    last_normal: &Header,
    current_number: u64,
) -> Difficulty {
    if config.ignore_difficulty_validation {
        return Difficulty::from_compact(TEST_DIFFICULTY_COMPACT);
    }
    if current_number >= config.show_height {
        return config.show_difficulty;
    }
    if config.block_count_of_period == 0 || config.block_generate == 0 {
        warn!(
            period = config.block_count_of_period,
            block_generate = config.block_generate,
            "zero retarget period, keeping difficulty"
        );
        return last_normal.diff;
    }
    if (current_number + 1) % config.block_count_of_period != 0 {
        return last_normal.diff;
    }

    let diff = retarget(config, &pre_span.timestamp, &last_normal.timestamp, &last_normal.diff);
    info!(
        height = current_number,
        old_compact = last_normal.diff.to_compact(),
        new_compact = diff.to_compact(),
        "difficulty retargeted"
    );
    diff
}

fn retarget(config: &ChainModelConfig, first: &U256, last: &U256, old: &Difficulty) -> Difficulty {
    let expected = U256::from(config.block_count_of_period.saturating_mul(config.block_generate));

    let elapsed = last.checked_sub(*first).unwrap_or_default() / U256::from(NANOS_PER_SECOND);
    let actual = elapsed.clamp(expected / 4, expected.saturating_mul(U256::from(4)));
    debug!(%expected, %elapsed, %actual, "period timespan");

    let scaled = U512::from(old.target()) * U512::from(actual) / U512::from(expected);
    let limit = U512::from(config.main_pow_limit);
    let target = if scaled > limit {
        config.main_pow_limit
    } else {
        U256::try_from(scaled).unwrap_or(config.main_pow_limit)
    };
    Difficulty::from_compact(Difficulty::from_target(target).to_compact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockNonce;

    fn config() -> ChainModelConfig {
        ChainModelConfig {
            block_count_of_period: 4096,
            block_generate: 13,
            ..ChainModelConfig::default()
        }
    }

    fn header(number: u64, seconds: u64, compact: u32) -> Header {
        Header {
            number,
            timestamp: U256::from(seconds) * U256::from(NANOS_PER_SECOND),
            diff: Difficulty::from_compact(compact),
            nonce: BlockNonce::from_u64(1),
            ..Header::default()
        }
    }

    #[test]
    fn test_last_period_block_num() {
        let p = 4096;
        assert_eq!(last_period_block_num(p, 0), 0);
        assert_eq!(last_period_block_num(p, p - 1), 0);
        assert_eq!(last_period_block_num(p, p), p);
        assert_eq!(last_period_block_num(p, p + 1), p);
        assert_eq!(last_period_block_num(p, 2 * p - 1), p);
        assert_eq!(last_period_block_num(p, 2 * p), 2 * p);
    }

    #[test]
    fn test_mid_period_keeps_last() {
        let cfg = config();
        let pre = header(5, 0, 0x1e00_ffff);
        let last = header(6, 100, 0x1d00_ffff);
        assert_eq!(new_work_diff(&cfg, &pre, &last, 12), last.diff);
    }

    #[test]
    fn test_on_schedule_keeps_target() {
        let cfg = config();
        let expected = 4096 * 13;
        let pre = header(0, 1_000, 0x1e00_ffff);
        let last = header(4094, 1_000 + expected, 0x1e00_ffff);
        assert_eq!(new_work_diff(&cfg, &pre, &last, 4095), last.diff);
    }

    #[test]
    fn test_fast_period_clamped_to_quarter() {
        let cfg = config();
        let pre = header(0, 0, 0x1e00_ffff);
        let last = header(4094, 1, 0x1e00_ffff);
        let diff = new_work_diff(&cfg, &pre, &last, 4095);
        assert_eq!(diff.target(), last.diff.target() / 4);
    }

    #[test]
    fn test_slow_period_clamped_and_capped() {
        let cfg = config();
        let pre = header(0, 0, 0x1e00_ffff);
        let last = header(4094, 10_000_000, 0x1e00_ffff);
        assert_eq!(
            new_work_diff(&cfg, &pre, &last, 4095).target(),
            last.diff.target() * 4
        );

        let easy = header(4094, 10_000_000, 0x20ff_ffff);
        let capped = new_work_diff(&cfg, &pre, &easy, 4095);
        assert!(capped.target() <= cfg.main_pow_limit);
        let limit = Difficulty::from_target(cfg.main_pow_limit);
        assert_eq!(capped, Difficulty::from_compact(limit.to_compact()));
    }

    #[test]
    fn test_retarget_rounds_to_compact() {
        let cfg = config();
        let expected = 4096 * 13;
        let pre = header(0, 0, 0x1e7f_ffff);
        let last = header(4094, expected - 1, 0x1e7f_ffff);

        let diff = new_work_diff(&cfg, &pre, &last, 4095);
        assert_eq!(diff, Difficulty::from_compact(diff.to_compact()));
        assert!(diff.target() < last.diff.target());
        assert_eq!(diff.to_compact() >> 24, 0x1e);
    }

    #[test]
    fn test_backwards_timestamps_clamped_to_quarter() {
        let cfg = config();
        let pre = header(0, 5_000, 0x1e00_ffff);
        let last = header(4094, 1_000, 0x1e00_ffff);
        let diff = new_work_diff(&cfg, &pre, &last, 4095);
        assert_eq!(diff.target(), last.diff.target() / 4);
    }

    #[test]
    fn test_zero_period_keeps_difficulty() {
        let pre = header(0, 0, 0x1e00_ffff);
        let last = header(4094, 1, 0x1d00_ffff);

        let cfg = ChainModelConfig { block_count_of_period: 0, ..config() };
        assert!(cfg.validate().is_err());
        assert_eq!(new_work_diff(&cfg, &pre, &last, 4095), last.diff);

        let cfg = ChainModelConfig { block_generate: 0, ..config() };
        assert_eq!(new_work_diff(&cfg, &pre, &last, 4095), last.diff);
    }

    #[test]
    fn test_overrides() {
        let mut cfg = config();
        let pre = header(0, 0, 0x1e00_ffff);
        let last = header(1, 0, 0x1d00_ffff);

        assert_eq!(new_work_diff(&cfg, &pre, &last, cfg.show_height), cfg.show_difficulty);

        cfg.ignore_difficulty_validation = true;
        assert_eq!(
            new_work_diff(&cfg, &pre, &last, 12),
            Difficulty::from_compact(TEST_DIFFICULTY_COMPACT)
        );
    }
}
