//! Verifier election priority
//!
//! Reputation blends stake, transaction count and past performance through
//! a saturating curve per input. Priority scales reputation by the cube of
//! the candidate's luck, taken from the last byte of its seed hash.

use shared_types::{Hash, U256};
use tracing::debug;

use crate::error::{ModelError, Result};

const SCALE: f64 = 10_000.0;

/// Smallest stake eligible for election.
pub const STAKE_VAL_MIN: f64 = 100.0;

/// Shape of one reputation curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    /// Switch point from the square-root segment to the logistic one
    pub e1: f64,
    /// Logistic steepness
    pub e2: f64,
    /// Logistic midpoint
    pub e3: f64,
}

pub const STAKE_CURVE: Curve = Curve { e1: 10_000.0, e2: 0.001, e3: 1_000.0 };
pub const NONCE_CURVE: Curve = Curve { e1: 100.0, e2: 0.008, e3: 500.0 };
pub const PERFORMANCE_CURVE: Curve = Curve { e1: 1.0, e2: 5.0, e3: 0.1 };

const STAKE_WEIGHT: f64 = 0.2;
const NONCE_WEIGHT: f64 = 0.1;
const PERFORMANCE_WEIGHT: f64 = 0.7;

/// Curve value of `x`, in `[0, 10000)`.
pub fn elem(x: f64, curve: Curve) -> Result<f64> {
    if x < 0.0 {
        return Err(ModelError::InvalidNumber);
    }
    let Curve { e1, e2, e3 } = curve;
    if x >= e1 {
        Ok(SCALE / (1.0 + (-e2 * (x - e3)).exp()))
    } else {
        Ok(SCALE * x.sqrt() / (e1.sqrt() * (1.0 + (e2 * (e3 - e1)).exp())))
    }
}

/// `⌊0.2 R(stake) + 0.1 R(nonce) + 0.7 R(performance / 100)⌋`.
pub fn cal_reputation(nonce: u64, stake: &U256, performance: u64) -> Result<u64> {
    let stake_val = stake_as_f64(stake);
    if stake_val < STAKE_VAL_MIN {
        debug!(stake = %stake, "stake below election minimum");
        return Err(ModelError::StakeNotSufficient);
    }

    let r1 = elem(stake_val, STAKE_CURVE)?;
    let r2 = elem(nonce as f64, NONCE_CURVE)?;
    let r3 = elem(performance as f64 / 100.0, PERFORMANCE_CURVE)?;
    Ok((STAKE_WEIGHT * r1 + NONCE_WEIGHT * r2 + PERFORMANCE_WEIGHT * r3) as u64)
}

/// `⌊reputation * (luck[31] / 256)^3⌋`.
pub fn cal_priority(luck: &Hash, reputation: u64) -> u64 {
    let ratio = f64::from(luck.0[31]) / 256.0;
    (reputation as f64 * ratio.powi(3)) as u64
}

// Stakes beyond u64 sit on the flat end of the curve anyway
fn stake_as_f64(stake: &U256) -> f64 {
    if stake.bits() > 64 {
        u64::MAX as f64
    } else {
        stake.low_u64() as f64
    }
}

/// Election scoring used by verifier selection.
pub trait PriorityCalculator: Send + Sync {
    fn elect_priority(&self, luck: &Hash, nonce: u64, stake: &U256, performance: u64) -> Result<u64>;

    fn reputation(&self, nonce: u64, stake: &U256, performance: u64) -> Result<u64>;
}

/// The curves and weights above.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPriorityCalculator;

impl PriorityCalculator for DefaultPriorityCalculator {
    fn elect_priority(&self, luck: &Hash, nonce: u64, stake: &U256, performance: u64) -> Result<u64> {
        let reputation = cal_reputation(nonce, stake, performance)?;
        Ok(cal_priority(luck, reputation))
    }

    fn reputation(&self, nonce: u64, stake: &U256, performance: u64) -> Result<u64> {
        cal_reputation(nonce, stake, performance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luck(last: u8) -> Hash {
        let mut bytes = [0x38; 32];
        bytes[31] = last;
        Hash(bytes)
    }

    #[test]
    fn test_elem_segments() {
        assert_eq!(elem(-1.0, NONCE_CURVE), Err(ModelError::InvalidNumber));
        assert_eq!(elem(0.0, STAKE_CURVE), Ok(0.0));
        // logistic segment saturates
        let high = elem(20_000.0, STAKE_CURVE).unwrap();
        assert!(high > 9_999.9 && high < SCALE);
        // midpoint of the logistic is half scale
        let mid = elem(500.0, Curve { e1: 100.0, e2: 0.008, e3: 500.0 }).unwrap();
        assert!((mid - SCALE / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_reputation_cases() {
        assert_eq!(cal_reputation(0, &U256::from(5_000), 0), Ok(1_414));
        assert_eq!(cal_reputation(70, &U256::from(500_000), 50), Ok(6_928));
        assert_eq!(cal_reputation(1_000, &U256::from(20_000), 100), Ok(9_905));
        assert_eq!(
            cal_reputation(0, &U256::zero(), 0),
            Err(ModelError::StakeNotSufficient)
        );
        assert_eq!(
            cal_reputation(0, &U256::from(99), 0),
            Err(ModelError::StakeNotSufficient)
        );
    }

    #[test]
    fn test_priority() {
        assert_eq!(cal_priority(&luck(0x56), 5_014), 190);
        assert_eq!(cal_priority(&luck(0), 5_014), 0);

        let calc = DefaultPriorityCalculator;
        assert_eq!(
            calc.elect_priority(&luck(0x99), 70, &U256::from(500_000), 50),
            Ok(1_478)
        );
        assert_eq!(calc.reputation(70, &U256::from(500_000), 50), Ok(6_928));
    }

    #[test]
    fn test_huge_stake_saturates() {
        let rep = cal_reputation(0, &U256::MAX, 0).unwrap();
        assert_eq!(rep, 2_000);
    }
}
