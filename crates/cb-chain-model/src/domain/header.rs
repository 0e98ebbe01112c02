//! Block header
//!
//! The block hash is `keccak256(rlp(header with nonce zeroed) ‖ nonce)`. Keeping
//! the nonce outside the encoding lets a miner hash the fixed prefix once and
//! vary only the trailing eight bytes.

use std::fmt;

use cb_bloom_filters::{Bloom, DEFAULT_BLOCK_BLOOM_CONFIG};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_crypto::{keccak256, keccak256_many};
use shared_types::{Address, BlockNonce, Difficulty, Hash, U256};

use crate::error::{ModelError, Result};

/// Gas limit of a freshly built header.
pub const DEFAULT_GAS_LIMIT: u64 = 6_666_666_666;

/// Number of RLP fields in a header.
pub const HEADER_FIELD_COUNT: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u64,
    /// Block height
    pub number: u64,
    /// VRF seed
    pub seed: Hash,
    /// VRF proof of the seed
    pub proof: Vec<u8>,
    pub miner_pub_key: Vec<u8>,
    pub pre_hash: Hash,
    pub diff: Difficulty,
    /// Unix time in nanoseconds
    pub timestamp: U256,
    pub coinbase: Address,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub nonce: BlockNonce,
    pub bloom: Bloom,
    pub transaction_root: Hash,
    pub state_root: Hash,
    pub verification_root: Hash,
    pub interlink_root: Hash,
    pub register_root: Hash,
    pub receipt_hash: Hash,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: 0,
            number: 0,
            seed: Hash::ZERO,
            proof: Vec::new(),
            miner_pub_key: Vec::new(),
            pre_hash: Hash::ZERO,
            diff: Difficulty::default(),
            timestamp: U256::zero(),
            coinbase: Address::default(),
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_used: 0,
            nonce: BlockNonce::default(),
            bloom: Bloom::new(DEFAULT_BLOCK_BLOOM_CONFIG),
            transaction_root: Hash::ZERO,
            state_root: Hash::ZERO,
            verification_root: Hash::ZERO,
            interlink_root: Hash::ZERO,
            register_root: Hash::ZERO,
            receipt_hash: Hash::ZERO,
        }
    }
}

impl Header {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u64,
        number: u64,
        pre_hash: Hash,
        seed: Hash,
        diff: Difficulty,
        timestamp: U256,
        coinbase: Address,
        nonce: BlockNonce,
    ) -> Self {
        Self {
            version,
            number,
            pre_hash,
            seed,
            diff,
            timestamp,
            coinbase,
            nonce,
            ..Self::default()
        }
    }

    /// Canonical encoding with the nonce zeroed.
    pub fn rlp_without_nonce(&self) -> Vec<u8> {
        let mut stream = RlpStream::new();
        self.append_fields(&mut stream, &BlockNonce::default());
        stream.out().to_vec()
    }

    /// Block hash: the nonce-free encoding followed by the raw nonce.
    pub fn hash(&self) -> Hash {
        keccak256_many(&[self.rlp_without_nonce().as_slice(), self.nonce.as_bytes()])
    }

    /// Digest the miner searches a nonce for.
    pub fn hash_without_nonce(&self) -> Hash {
        keccak256(&self.rlp_without_nonce())
    }

    /// Special blocks carry neither difficulty nor nonce and are not mined.
    pub fn is_special(&self) -> bool {
        self.diff.is_zero() && self.nonce.is_zero()
    }

    /// Always fails; headers are compared through their hashes.
    pub fn is_equal(&self, _other: &Header) -> Result<bool> {
        Err(ModelError::Unimplemented("Header::is_equal"))
    }

    /// Encoded length in bytes.
    pub fn size(&self) -> usize {
        rlp::encode(self).len()
    }

    fn append_fields(&self, s: &mut RlpStream, nonce: &BlockNonce) {
        s.begin_list(HEADER_FIELD_COUNT);
        s.append(&self.version);
        s.append(&self.number);
        s.append(&self.seed);
        s.append(&self.proof);
        s.append(&self.miner_pub_key);
        s.append(&self.pre_hash);
        s.append(&self.diff);
        s.append(&self.timestamp);
        s.append(&self.coinbase);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(nonce);
        s.append(&self.bloom);
        s.append(&self.transaction_root);
        s.append(&self.state_root);
        s.append(&self.verification_root);
        s.append(&self.interlink_root);
        s.append(&self.register_root);
        s.append(&self.receipt_hash);
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        self.append_fields(s, &self.nonce);
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != HEADER_FIELD_COUNT {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            version: rlp.val_at(0)?,
            number: rlp.val_at(1)?,
            seed: rlp.val_at(2)?,
            proof: rlp.val_at(3)?,
            miner_pub_key: rlp.val_at(4)?,
            pre_hash: rlp.val_at(5)?,
            diff: rlp.val_at(6)?,
            timestamp: rlp.val_at(7)?,
            coinbase: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            nonce: rlp.val_at(11)?,
            bloom: rlp.val_at(12)?,
            transaction_root: rlp.val_at(13)?,
            state_root: rlp.val_at(14)?,
            verification_root: rlp.val_at(15)?,
            interlink_root: rlp.val_at(16)?,
            register_root: rlp.val_at(17)?,
            receipt_hash: rlp.val_at(18)?,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Header({})", self.hash())?;
        writeln!(f, "  number:            {}", self.number)?;
        writeln!(f, "  pre_hash:          {}", self.pre_hash)?;
        writeln!(f, "  diff:              {}", self.diff)?;
        writeln!(f, "  timestamp:         {}", self.timestamp)?;
        writeln!(f, "  coinbase:          {}", self.coinbase)?;
        writeln!(f, "  nonce:             {}", self.nonce)?;
        writeln!(f, "  txs_root:          {}", self.transaction_root)?;
        writeln!(f, "  state_root:        {}", self.state_root)?;
        writeln!(f, "  verification_root: {}", self.verification_root)?;
        write!(f, "  interlink_root:    {}", self.interlink_root)
    }
}
