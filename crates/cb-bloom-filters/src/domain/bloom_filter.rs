//! Block transaction bloom
//!
//! INVARIANTS:
//! - No false negatives: after `digest(key)`, `lookup(key)` returns true
//! - Bit `i` lives in byte `len - 1 - i / 8`, bit `i % 8` (big-endian layout)

use bitvec::prelude::*;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::serde_hex;

use super::config::BloomConfig;
use super::hash_functions::hash_words;
use crate::error::FilterError;

/// Fixed-size bloom filter over byte-string keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BloomJson", into = "BloomJson")]
pub struct Bloom {
    /// Raw filter bytes; position `j` of the bit vector is byte `j / 8`, bit `j % 8`
    bits: BitVec<u8, Lsb0>,
    config: BloomConfig,
}

impl Bloom {
    /// Create an empty filter
    pub fn new(config: BloomConfig) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; config.byte_length * 8],
            config,
        }
    }

    /// Rebuild a filter from its raw bytes
    pub fn from_parts(bytes: Vec<u8>, config: BloomConfig) -> Result<Self, FilterError> {
        config.validate()?;
        if bytes.len() != config.byte_length {
            return Err(FilterError::LengthMismatch {
                expected: config.byte_length,
                got: bytes.len(),
            });
        }
        Ok(Self {
            bits: BitVec::from_vec(bytes),
            config,
        })
    }

    pub fn config(&self) -> BloomConfig {
        self.config
    }

    /// Raw filter bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    pub fn hex(&self) -> String {
        serde_hex::encode_prefixed(self.as_bytes())
    }

    /// Number of bits set
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Position in the bit vector of filter bit `index`, if in range.
    fn position(&self, index: u32) -> Option<usize> {
        let index = index as usize;
        if index >= self.bits.len() {
            return None;
        }
        let byte = self.config.byte_length - 1 - index / 8;
        Some(byte * 8 + index % 8)
    }

    /// Set filter bit `index`; out-of-range indices are ignored.
    pub fn set_at(&mut self, index: u32) {
        if let Some(pos) = self.position(index) {
            self.bits.set(pos, true);
        }
    }

    /// Read filter bit `index`; out-of-range indices read as unset.
    pub fn look_at(&self, index: u32) -> bool {
        self.position(index).is_some_and(|pos| self.bits[pos])
    }

    /// Insert `key`
    pub fn digest(&mut self, key: &[u8]) -> &mut Self {
        let mask = self.config.index_mask();
        for word in hash_words(key, self.config.hash_count) {
            self.set_at(word & mask);
        }
        self
    }

    /// Test whether `key` may have been inserted. False positives are possible.
    pub fn lookup(&self, key: &[u8]) -> bool {
        let mask = self.config.index_mask();
        hash_words(key, self.config.hash_count)
            .into_iter()
            .all(|word| self.look_at(word & mask))
    }

    /// OR `other` into this filter. Both must share a configuration.
    pub fn union(&mut self, other: &Bloom) -> Result<(), FilterError> {
        if self.config != other.config {
            return Err(FilterError::InvalidParameters(
                "cannot merge filters with different configs".to_string(),
            ));
        }
        for (dst, src) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *dst |= *src;
        }
        Ok(())
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }
}

impl Default for Bloom {
    fn default() -> Self {
        Self::new(BloomConfig::default())
    }
}

impl std::fmt::Debug for Bloom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bloom")
            .field("bloom", &self.hex())
            .field("byte_length", &self.config.byte_length)
            .field("hash_count", &self.config.hash_count)
            .finish()
    }
}

impl Encodable for Bloom {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.as_bytes().to_vec());
        s.append(&self.config);
    }
}

impl Decodable for Bloom {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let bytes: Vec<u8> = rlp.val_at(0)?;
        let config: BloomConfig = rlp.val_at(1)?;
        Self::from_parts(bytes, config).map_err(|_| DecoderError::Custom("bloom length mismatch"))
    }
}

/// JSON shape of a bloom
#[derive(Serialize, Deserialize)]
struct BloomJson {
    #[serde(with = "serde_hex::bytes")]
    bloom: Vec<u8>,
    #[serde(with = "serde_hex::quantity")]
    byte_length: u64,
    #[serde(with = "serde_hex::quantity")]
    hash_count: u64,
}

impl From<Bloom> for BloomJson {
    fn from(bloom: Bloom) -> Self {
        Self {
            byte_length: bloom.config.byte_length as u64,
            hash_count: u64::from(bloom.config.hash_count),
            bloom: bloom.bits.into_vec(),
        }
    }
}

impl TryFrom<BloomJson> for Bloom {
    type Error = FilterError;

    fn try_from(json: BloomJson) -> Result<Self, Self::Error> {
        let invalid = |what: &str| FilterError::InvalidParameters(format!("{what} out of range"));
        let config = BloomConfig {
            byte_length: usize::try_from(json.byte_length).map_err(|_| invalid("byte_length"))?,
            hash_count: u32::try_from(json.hash_count).map_err(|_| invalid("hash_count"))?,
        };
        Bloom::from_parts(json.bloom, config)
    }
}
