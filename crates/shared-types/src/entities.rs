//! # Chain Primitives
//!
//! Fixed-width values every other crate builds on.
//!
//! ## Clusters
//!
//! - **Digests**: `Hash`
//! - **Accounts**: `Address`, `AddressType`
//! - **Mining**: `Difficulty`, `BlockNonce`
//!
//! All of them encode to RLP as a plain byte string of their full width and to
//! JSON as a `0x`-prefixed hex string.

use std::fmt;
use std::str::FromStr;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::TypesError;
use crate::serde_hex;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::{U256, U512};

/// Implements the hex, serde and RLP surface shared by fixed-width newtypes.
macro_rules! fixed_bytes {
    ($name:ident, $len:expr, $kind:literal) => {
        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Builds the value from a slice of exactly `LEN` bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
                if bytes.len() != $len {
                    return Err(TypesError::InvalidLength {
                        kind: $kind,
                        expected: $len,
                        got: bytes.len(),
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_vec(&self) -> Vec<u8> {
                self.0.to_vec()
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// `0x`-prefixed lowercase hex.
            pub fn hex(&self) -> String {
                serde_hex::encode_prefixed(&self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.hex())
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_hex::decode_fixed::<$len>(s, $kind).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(D::Error::custom)
            }
        }

        impl Encodable for $name {
            fn rlp_append(&self, s: &mut RlpStream) {
                s.encoder().encode_value(&self.0);
            }
        }

        impl Decodable for $name {
            fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
                rlp.decoder().decode_value(|bytes| match bytes.len() {
                    n if n < $len => Err(DecoderError::RlpIsTooShort),
                    n if n > $len => Err(DecoderError::RlpIsTooBig),
                    _ => {
                        let mut out = [0u8; $len];
                        out.copy_from_slice(bytes);
                        Ok(Self(out))
                    }
                })
            }
        }
    };
}

// =============================================================================
// DIGESTS
// =============================================================================

/// A 32-byte Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

fixed_bytes!(Hash, 32, "hash");

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Interprets the digest as a big-endian unsigned integer.
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    pub fn from_u256(value: U256) -> Self {
        let mut out = [0u8; 32];
        value.to_big_endian(&mut out);
        Self(out)
    }

    /// True when the digest, read as an integer, is at most the difficulty target.
    pub fn meets(&self, difficulty: &Difficulty) -> bool {
        self.to_u256() <= difficulty.target()
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Routing class of an address, taken from its two leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    Normal,
    /// Hash-lock / time-lock account shared by two parties.
    Cross,
    Stake,
    Cancel,
    UnStake,
    Evidence,
    Erc20,
    EarlyReward,
    ContractCreate,
    ContractCall,
    SmartContract,
    Unknown(u16),
}

impl AddressType {
    pub const fn tag(self) -> u16 {
        match self {
            AddressType::Normal => 0x0000,
            AddressType::Cross => 0x0001,
            AddressType::Stake => 0x0002,
            AddressType::Cancel => 0x0003,
            AddressType::UnStake => 0x0004,
            AddressType::Evidence => 0x0005,
            AddressType::Erc20 => 0x0010,
            AddressType::EarlyReward => 0x0011,
            AddressType::ContractCreate => 0x0012,
            AddressType::ContractCall => 0x0013,
            AddressType::SmartContract => 0x0016,
            AddressType::Unknown(tag) => tag,
        }
    }

    pub const fn from_tag(tag: u16) -> Self {
        match tag {
            0x0000 => AddressType::Normal,
            0x0001 => AddressType::Cross,
            0x0002 => AddressType::Stake,
            0x0003 => AddressType::Cancel,
            0x0004 => AddressType::UnStake,
            0x0005 => AddressType::Evidence,
            0x0010 => AddressType::Erc20,
            0x0011 => AddressType::EarlyReward,
            0x0012 => AddressType::ContractCreate,
            0x0013 => AddressType::ContractCall,
            0x0016 => AddressType::SmartContract,
            other => AddressType::Unknown(other),
        }
    }

    /// Contract-create and contract-call transactions settle their fee after execution.
    pub fn is_contract(self) -> bool {
        matches!(self, AddressType::ContractCreate | AddressType::ContractCall)
    }

    pub fn name(self) -> &'static str {
        match self {
            AddressType::Normal => "Normal",
            AddressType::Cross => "CrossChain",
            AddressType::Stake => "Stake",
            AddressType::Cancel => "Cancel",
            AddressType::UnStake => "UnStake",
            AddressType::Evidence => "Evidence",
            AddressType::Erc20 => "ERC20",
            AddressType::EarlyReward => "EarlyReward",
            AddressType::ContractCreate => "ContractCreate",
            AddressType::ContractCall => "ContractCall",
            AddressType::SmartContract => "SmartContract",
            AddressType::Unknown(_) => "UnKnown",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 22-byte account address: a big-endian `u16` type tag followed by a
/// 20-byte body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 22]);

fixed_bytes!(Address, 22, "address");

impl Address {
    /// Length of the body that follows the type tag.
    pub const BODY_LEN: usize = 20;

    /// Joins a type tag with a 20-byte body.
    pub fn with_type(kind: AddressType, body: &[u8; 20]) -> Self {
        let mut out = [0u8; 22];
        out[..2].copy_from_slice(&kind.tag().to_be_bytes());
        out[2..].copy_from_slice(body);
        Self(out)
    }

    /// The well-known address for a type: the tag followed by zeros.
    pub fn fixed(kind: AddressType) -> Self {
        Self::with_type(kind, &[0u8; 20])
    }

    /// Destination of register (stake) transactions.
    pub fn stake() -> Self {
        Self::fixed(AddressType::Stake)
    }

    pub fn cancel() -> Self {
        Self::fixed(AddressType::Cancel)
    }

    pub fn unstake() -> Self {
        Self::fixed(AddressType::UnStake)
    }

    pub fn address_type(&self) -> AddressType {
        AddressType::from_tag(u16::from_be_bytes([self.0[0], self.0[1]]))
    }

    pub fn body(&self) -> &[u8] {
        &self.0[2..]
    }

    /// Same body under a different type tag.
    pub fn retyped(&self, kind: AddressType) -> Self {
        let mut out = self.0;
        out[..2].copy_from_slice(&kind.tag().to_be_bytes());
        Self(out)
    }

    /// The evidence account that reports misbehaviour of `self`.
    pub fn evidence_of(&self) -> Self {
        self.retyped(AddressType::Evidence)
    }

    /// Recovers the reported account from an evidence address.
    pub fn normal_from_evidence(&self) -> Self {
        self.retyped(AddressType::Normal)
    }

    pub fn eq_without_type(&self, other: &Address) -> bool {
        self.body() == other.body()
    }
}

// =============================================================================
// MINING
// =============================================================================

/// An 8-byte proof-of-work nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockNonce(pub [u8; 8]);

fixed_bytes!(BlockNonce, 8, "block nonce");

impl BlockNonce {
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

/// A 32-byte big-endian proof-of-work target. A block hash is valid when it is
/// numerically at most the target. The all-zero value marks special blocks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Difficulty(pub [u8; 32]);

fixed_bytes!(Difficulty, 32, "difficulty");

impl Difficulty {
    /// The target as an integer.
    pub fn target(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    pub fn from_target(target: U256) -> Self {
        let mut out = [0u8; 32];
        target.to_big_endian(&mut out);
        Self(out)
    }

    /// Expands the 4-byte compact form `exponent ‖ mantissa`: the three
    /// mantissa bytes land at offset `32 - exponent` of the target.
    pub fn from_compact(compact: u32) -> Self {
        let exponent = (compact >> 24) as usize;
        let mantissa = U256::from(compact & 0x00ff_ffff);
        let target = match exponent {
            0..=3 => mantissa >> (8 * (3 - exponent)),
            4..=32 => mantissa << (8 * (exponent - 3)),
            _ => U256::MAX,
        };
        Self::from_target(target)
    }

    /// Packs the target into compact form, keeping the top three significant
    /// bytes with the mantissa's high bit clear.
    pub fn to_compact(&self) -> u32 {
        let target = self.target();
        if target.is_zero() {
            return 0;
        }
        let mut exponent = (target.bits() + 7) / 8;
        let mut mantissa = if exponent <= 3 {
            target.low_u32() << (8 * (3 - exponent))
        } else {
            (target >> (8 * (exponent - 3))).low_u32()
        };
        if mantissa & 0x0080_0000 != 0 {
            mantissa >>= 8;
            exponent += 1;
        }
        ((exponent as u32) << 24) | mantissa
    }
}
