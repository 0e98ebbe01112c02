//! Bloom filter sizing
//!
//! A filter is described by its byte length (always a power of two, at least
//! one byte) and the number of hash indices set per key.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::error::FilterError;

/// Largest number of indices a single Keccak-256 digest can provide.
pub const MAX_HASH_COUNT: u32 = 8;

/// Smallest accepted `log2` of the bit length (one byte).
pub const MIN_LOG2_BITS: u32 = 3;

/// Largest accepted `log2` of the bit length; indices are 32-bit words.
pub const MAX_LOG2_BITS: u32 = 32;

/// Bloom filter configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BloomConfig {
    /// Length of the filter in bytes
    pub byte_length: usize,
    /// Number of hash indices per key (k)
    pub hash_count: u32,
}

/// Configuration of the bloom carried in every block header.
pub const DEFAULT_BLOCK_BLOOM_CONFIG: BloomConfig = BloomConfig {
    byte_length: 1 << (8 - MIN_LOG2_BITS),
    hash_count: 4,
};

/// Sizing of the invertible bloom table peers exchange to reconcile block
/// transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InvBloomConfig {
    pub cell_count: usize,
    pub hash_count: u32,
}

pub const DEFAULT_INV_BLOOM_CONFIG: InvBloomConfig = InvBloomConfig {
    cell_count: 1 << 12,
    hash_count: 4,
};

impl BloomConfig {
    /// Create a configuration from `log2` of the length in bits and the
    /// number of hash indices.
    pub fn new(log2_bits: u32, hash_count: u32) -> Result<Self, FilterError> {
        if !(MIN_LOG2_BITS..=MAX_LOG2_BITS).contains(&log2_bits) {
            return Err(FilterError::InvalidParameters(format!(
                "log2 bit length {log2_bits} outside {MIN_LOG2_BITS}..={MAX_LOG2_BITS}"
            )));
        }
        let config = Self {
            byte_length: 1usize << (log2_bits - MIN_LOG2_BITS),
            hash_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate a configuration received from the wire
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.byte_length == 0 || !self.byte_length.is_power_of_two() {
            return Err(FilterError::InvalidParameters(format!(
                "byte length {} is not a power of two",
                self.byte_length
            )));
        }
        if self.size_bits() > 1u64 << MAX_LOG2_BITS {
            return Err(FilterError::InvalidParameters(format!(
                "byte length {} too large",
                self.byte_length
            )));
        }
        if self.hash_count == 0 || self.hash_count > MAX_HASH_COUNT {
            return Err(FilterError::InvalidParameters(format!(
                "hash count {} outside 1..={MAX_HASH_COUNT}",
                self.hash_count
            )));
        }
        Ok(())
    }

    /// Filter size in bits
    pub fn size_bits(&self) -> u64 {
        self.byte_length as u64 * 8
    }

    /// Mask applied to every raw 32-bit hash word.
    pub(crate) fn index_mask(&self) -> u32 {
        (self.size_bits() - 1) as u32
    }
}

impl Default for BloomConfig {
    fn default() -> Self {
        DEFAULT_BLOCK_BLOOM_CONFIG
    }
}

/// Proposed configuration for `count` elements: about 30 bits per element,
/// rounded up to a power of two, with four hash indices.
pub fn derive_config(count: usize) -> BloomConfig {
    let scaled = (count as u64).saturating_mul(30);
    let log2_bits = (u64::BITS - scaled.leading_zeros()).clamp(MIN_LOG2_BITS, MAX_LOG2_BITS);
    BloomConfig {
        byte_length: 1usize << (log2_bits - MIN_LOG2_BITS),
        hash_count: 4,
    }
}

impl Encodable for BloomConfig {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&(self.byte_length as u64));
        s.append(&self.hash_count);
    }
}

impl Decodable for BloomConfig {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let byte_length: u64 = rlp.val_at(0)?;
        let config = Self {
            byte_length: usize::try_from(byte_length)
                .map_err(|_| DecoderError::Custom("bloom byte length overflows"))?,
            hash_count: rlp.val_at(1)?,
        };
        config
            .validate()
            .map_err(|_| DecoderError::Custom("invalid bloom config"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_converts_bits_to_bytes() {
        let config = BloomConfig::new(8, 4).unwrap();
        assert_eq!(config.byte_length, 32);
        assert_eq!(config.hash_count, 4);
        assert_eq!(config, DEFAULT_BLOCK_BLOOM_CONFIG);
        assert_eq!(BloomConfig::new(3, 1).unwrap().byte_length, 1);
    }

    #[test]
    fn test_default_configs() {
        assert_eq!(DEFAULT_BLOCK_BLOOM_CONFIG.size_bits(), 256);
        assert_eq!(DEFAULT_INV_BLOOM_CONFIG.cell_count, 4096);
        assert_eq!(DEFAULT_INV_BLOOM_CONFIG.hash_count, 4);
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(BloomConfig::new(2, 4).is_err());
        assert!(BloomConfig::new(33, 4).is_err());
        assert!(BloomConfig::new(8, 0).is_err());
        assert!(BloomConfig::new(8, 9).is_err());
    }

    #[test]
    fn test_derive_config_scales_with_count() {
        // 30 * 10 = 300 needs 9 bits, so 2^9 bits = 64 bytes
        assert_eq!(derive_config(10).byte_length, 64);
        // 30 * 1 = 30 needs 5 bits
        assert_eq!(derive_config(1).byte_length, 4);
        assert_eq!(derive_config(0).byte_length, 1);
        assert_eq!(derive_config(1000).hash_count, 4);
    }

    #[test]
    fn test_derived_config_always_valid() {
        for count in [0usize, 1, 7, 100, 5000, 1 << 20] {
            assert!(derive_config(count).validate().is_ok(), "count {count}");
        }
    }

    #[test]
    fn test_config_rlp_layout() {
        let encoded = rlp::encode(&DEFAULT_BLOCK_BLOOM_CONFIG).to_vec();
        assert_eq!(encoded, vec![0xc2, 0x20, 0x04]);
        let decoded: BloomConfig = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, DEFAULT_BLOCK_BLOOM_CONFIG);
    }

    #[test]
    fn test_config_decode_rejects_non_power_of_two() {
        let mut s = RlpStream::new_list(2);
        s.append(&3u64).append(&4u32);
        assert!(rlp::decode::<BloomConfig>(&s.out()).is_err());
    }
}
