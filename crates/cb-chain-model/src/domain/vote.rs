//! Verification votes
//!
//! A vote is scoped to `(height, round, block_id)` and signed by a verifier.
//! Its digest is taken with the witness cleared so the signature never covers
//! itself.

use std::time::{SystemTime, UNIX_EPOCH};

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_crypto::{normal_address, recover_pubkey, rlp_hash, CryptoError, Secp256k1KeyPair};
use shared_types::{serde_hex, Address, Hash};
use tracing::warn;

use crate::error::{ModelError, Result};

/// Kind of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum VoteMsgType {
    PreVote = 0,
    Vote = 1,
    /// Sent by boot nodes while verifiers are halted
    VerBootNodeVote = 2,
    /// Sent by live verifiers while verifiers are halted
    AliveVerifierVote = 3,
}

impl TryFrom<u8> for VoteMsgType {
    type Error = &'static str;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteMsgType::PreVote),
            1 => Ok(VoteMsgType::Vote),
            2 => Ok(VoteMsgType::VerBootNodeVote),
            3 => Ok(VoteMsgType::AliveVerifierVote),
            _ => Err("unknown vote type"),
        }
    }
}

impl From<VoteMsgType> for u8 {
    fn from(kind: VoteMsgType) -> Self {
        kind as u8
    }
}

/// Signer of a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitMsg {
    pub address: Address,
    /// 65-byte `r ‖ s ‖ v` signature over the vote hash
    #[serde(with = "serde_hex::bytes")]
    pub sign: Vec<u8>,
}

impl WitMsg {
    /// Recover the signer address of `digest` from `sign`.
    pub fn recover(&self, digest: &Hash) -> Result<Address> {
        let sig: [u8; 65] = self
            .sign
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        let public_key = recover_pubkey(digest, &sig)?;
        Ok(normal_address(&public_key))
    }

    /// Check that `sign` over `digest` was produced by `address`.
    pub fn valid(&self, digest: &Hash) -> Result<()> {
        if self.recover(digest)? == self.address {
            Ok(())
        } else {
            Err(CryptoError::InvalidSignature.into())
        }
    }
}

impl Encodable for WitMsg {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append(&self.sign);
    }
}

impl Decodable for WitMsg {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            address: rlp.val_at(0)?,
            sign: rlp.val_at(1)?,
        })
    }
}

/// A signed verification vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMsg {
    #[serde(with = "serde_hex::quantity")]
    pub height: u64,
    #[serde(with = "serde_hex::quantity")]
    pub round: u64,
    pub block_id: Hash,
    pub vote_type: VoteMsgType,
    /// Unix time in nanoseconds
    #[serde(with = "serde_hex::quantity")]
    pub timestamp: u64,
    pub witness: Option<WitMsg>,
}

impl VoteMsg {
    /// Unsigned vote stamped with the current time.
    pub fn new(height: u64, round: u64, block_id: Hash, vote_type: VoteMsgType) -> Self {
        Self {
            height,
            round,
            block_id,
            vote_type,
            timestamp: now_nanos(),
            witness: None,
        }
    }

    /// Vote signed through `sign`, which receives the vote hash and returns
    /// the 65-byte signature.
    pub fn new_with_sign<F>(
        height: u64,
        round: u64,
        block_id: Hash,
        vote_type: VoteMsgType,
        sign: F,
        address: Address,
    ) -> Result<Self>
    where
        F: FnOnce(&Hash) -> Result<Vec<u8>>,
    {
        let mut vote = Self::new(height, round, block_id, vote_type);
        let signature = sign(&vote.hash())?;
        vote.witness = Some(WitMsg {
            address,
            sign: signature,
        });
        Ok(vote)
    }

    /// Sign with a local key.
    pub fn signed_by(
        height: u64,
        round: u64,
        block_id: Hash,
        vote_type: VoteMsgType,
        key: &Secp256k1KeyPair,
    ) -> Result<Self> {
        Self::new_with_sign(
            height,
            round,
            block_id,
            vote_type,
            |digest| Ok(key.sign_recoverable(digest)?.to_vec()),
            key.address(),
        )
    }

    /// Digest of the vote with its witness cleared.
    pub fn hash(&self) -> Hash {
        rlp_hash(&Unwitnessed(self))
    }

    /// Signer address, or the zero address for an unsigned vote.
    pub fn address(&self) -> Address {
        self.witness
            .as_ref()
            .map(|w| w.address)
            .unwrap_or_default()
    }

    /// Check the witness signature against the witness address.
    pub fn valid(&self) -> Result<()> {
        self.witness
            .as_ref()
            .ok_or(ModelError::MissingWitness)?
            .valid(&self.hash())
    }

    /// Accept only boot-node votes from `boot_nodes` and alive-verifier votes
    /// from `verifiers`, both carrying a signature that recovers to their
    /// witness address.
    pub fn halted_vote_valid(&self, verifiers: &[Address], boot_nodes: &[Address]) -> Result<()> {
        if matches!(self.vote_type, VoteMsgType::Vote | VoteMsgType::PreVote) {
            return Err(ModelError::WrongVoteType);
        }

        let witness = self.witness.as_ref().ok_or(ModelError::MissingWitness)?;
        let recovered = witness.recover(&self.hash()).inspect_err(|e| {
            warn!(height = self.height, error = %e, "recover address from vote witness failed");
        })?;
        if recovered != witness.address {
            return Err(ModelError::VoteRecoverAddrError);
        }

        match self.vote_type {
            VoteMsgType::VerBootNodeVote if !boot_nodes.contains(&recovered) => {
                warn!(address = %recovered, "halted vote from non boot node");
                Err(ModelError::AddressIsNotVerifierBootNode)
            }
            VoteMsgType::AliveVerifierVote if !verifiers.contains(&recovered) => {
                warn!(address = %recovered, "halted vote from non current verifier");
                Err(ModelError::AddressIsNotCurrentVerifier)
            }
            _ => Ok(()),
        }
    }

    fn append_fields(&self, s: &mut RlpStream) {
        s.append(&self.height);
        s.append(&self.round);
        s.append(&self.block_id);
        s.append(&(self.vote_type as u8));
        s.append(&self.timestamp);
    }
}

/// View of a vote that encodes its witness as the empty list.
struct Unwitnessed<'a>(&'a VoteMsg);

impl Encodable for Unwitnessed<'_> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        self.0.append_fields(s);
        s.begin_list(0);
    }
}

impl Encodable for VoteMsg {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        self.append_fields(s);
        match &self.witness {
            Some(witness) => s.append(witness),
            None => s.begin_list(0),
        };
    }
}

impl Decodable for VoteMsg {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 6 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let kind: u8 = rlp.val_at(3)?;
        let witness = rlp.at(5)?;
        Ok(Self {
            height: rlp.val_at(0)?,
            round: rlp.val_at(1)?,
            block_id: rlp.val_at(2)?,
            vote_type: VoteMsgType::try_from(kind).map_err(DecoderError::Custom)?,
            timestamp: rlp.val_at(4)?,
            witness: if witness.is_list() && witness.item_count()? == 0 {
                None
            } else {
                Some(witness.as_val()?)
            },
        })
    }
}

pub(crate) fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
