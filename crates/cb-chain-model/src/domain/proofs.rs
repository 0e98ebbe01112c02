use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::Hash;

use super::vote::VoteMsg;

/// Equivocation evidence carried in the data of an evidence transaction: two
/// conflicting votes by the same verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proofs {
    pub vote_a: VoteMsg,
    pub vote_b: VoteMsg,
    pub vrf_hash: Hash,
    pub proof: Vec<u8>,
    pub priority: u64,
}

impl Proofs {
    /// Evidence with no election proof attached.
    pub fn new(vote_a: VoteMsg, vote_b: VoteMsg) -> Self {
        Self {
            vote_a,
            vote_b,
            vrf_hash: Hash::ZERO,
            proof: Vec::new(),
            priority: 0,
        }
    }

    /// True when both votes target the same height and round but different
    /// blocks.
    pub fn is_equivocation(&self) -> bool {
        self.vote_a.height == self.vote_b.height
            && self.vote_a.round == self.vote_b.round
            && self.vote_a.vote_type == self.vote_b.vote_type
            && self.vote_a.block_id != self.vote_b.block_id
    }
}

impl Encodable for Proofs {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.vote_a);
        s.append(&self.vote_b);
        s.append(&self.vrf_hash);
        s.append(&self.proof);
        s.append(&self.priority);
    }
}

impl Decodable for Proofs {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 5 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            vote_a: rlp.val_at(0)?,
            vote_b: rlp.val_at(1)?,
            vrf_hash: rlp.val_at(2)?,
            proof: rlp.val_at(3)?,
            priority: rlp.val_at(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vote::VoteMsgType;

    #[test]
    fn test_equivocation_and_round_trip() {
        let a = VoteMsg::new(10, 0, Hash([1; 32]), VoteMsgType::Vote);
        let mut b = a.clone();
        b.block_id = Hash([2; 32]);

        let proofs = Proofs::new(a.clone(), b);
        assert!(proofs.is_equivocation());
        assert!(!Proofs::new(a.clone(), a).is_equivocation());

        let decoded: Proofs = rlp::decode(&rlp::encode(&proofs)).unwrap();
        assert_eq!(decoded, proofs);
    }
}
