use rlp::{Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{serde_hex, Address, Hash};

use super::vote::VoteMsg;
use crate::error::Result;

/// A commit entry of a block body: a typed vote, or the raw RLP item of a
/// verification kind this node does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Verification {
    Vote(VoteMsg),
    Opaque(#[serde(with = "serde_hex::bytes")] Vec<u8>),
}

impl Verification {
    /// Decode one body item, keeping it opaque when it is not a vote.
    pub(crate) fn decode_lenient(item: &Rlp) -> Self {
        match item.as_val::<VoteMsg>() {
            Ok(vote) => Verification::Vote(vote),
            Err(_) => Verification::Opaque(item.as_raw().to_vec()),
        }
    }

    pub fn hash(&self) -> Hash {
        match self {
            Verification::Vote(vote) => vote.hash(),
            Verification::Opaque(raw) => keccak256(raw),
        }
    }

    pub fn as_vote(&self) -> Option<&VoteMsg> {
        match self {
            Verification::Vote(vote) => Some(vote),
            Verification::Opaque(_) => None,
        }
    }

    /// Signer of a vote; `None` for opaque entries.
    pub fn address(&self) -> Option<Address> {
        self.as_vote().map(VoteMsg::address)
    }

    /// Signature check for votes. Opaque entries are accepted as they are
    /// validated by whoever understands them.
    pub fn valid(&self) -> Result<()> {
        match self {
            Verification::Vote(vote) => vote.valid(),
            Verification::Opaque(_) => Ok(()),
        }
    }
}

impl From<VoteMsg> for Verification {
    fn from(vote: VoteMsg) -> Self {
        Verification::Vote(vote)
    }
}

impl Encodable for Verification {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            Verification::Vote(vote) => vote.rlp_append(s),
            // zero here: the enclosing `append` counts the item
            Verification::Opaque(raw) => {
                s.append_raw(raw, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vote::VoteMsgType;

    #[test]
    fn test_opaque_is_reencoded_verbatim() {
        let mut s = RlpStream::new_list(2);
        s.append(&"foreign").append(&7u8);
        let raw = s.out().to_vec();

        let entry = Verification::decode_lenient(&Rlp::new(&raw));
        assert_eq!(entry, Verification::Opaque(raw.clone()));
        assert_eq!(rlp::encode(&entry).to_vec(), raw);
        assert_eq!(entry.hash(), keccak256(&raw));
        assert!(entry.valid().is_ok());
    }

    #[test]
    fn test_opaque_inside_list_counts_once() {
        let raw = rlp::encode(&"foreign").to_vec();
        let vote = VoteMsg::new(2, 0, Hash([3; 32]), VoteMsgType::Vote);
        let entries = vec![
            Verification::Opaque(raw.clone()),
            Verification::Vote(vote.clone()),
            Verification::Opaque(raw.clone()),
        ];
        let mut s = RlpStream::new();
        s.append_list::<Verification, _>(&entries);
        let bytes = s.out();

        let list = Rlp::new(&bytes);
        assert_eq!(list.item_count().unwrap(), 3);
        assert_eq!(list.at(0).unwrap().as_raw(), raw.as_slice());
        assert_eq!(list.val_at::<VoteMsg>(1).unwrap(), vote);
        assert_eq!(list.at(2).unwrap().as_raw(), raw.as_slice());
    }

    #[test]
    fn test_vote_entry() {
        let vote = VoteMsg::new(2, 0, Hash([3; 32]), VoteMsgType::Vote);
        let bytes = rlp::encode(&vote).to_vec();
        let entry = Verification::decode_lenient(&Rlp::new(&bytes));
        assert_eq!(entry.as_vote(), Some(&vote));
        assert_eq!(entry.hash(), vote.hash());
        assert_eq!(rlp::encode(&entry).to_vec(), bytes);
    }
}
