//! Inter-link chains
//!
//! Entry `i` of a block's inter-link is the most recent ancestor whose hash
//! beat the target by at least `2^i`. Entry 0 is always the parent. Light
//! clients walk the highest levels to skip most of the chain.

use std::ops::Deref;

use cb_state_trie::{derive_sha, index_key, DerivableList};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, U256};

use super::header::Header;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterLink(pub Vec<Hash>);

impl InterLink {
    /// Inter-link of `header`, extending the parent's `prev`.
    pub fn next(prev: &InterLink, header: &Header) -> Self {
        if header.number == 1 {
            return Self(vec![header.pre_hash, header.pre_hash]);
        }

        let mut links = prev.0.clone();
        let max_level = if header.is_special() {
            0
        } else {
            hash_level(&header.pre_hash, &header.diff.target())
        };
        for level in 1..=max_level {
            if level < links.len() {
                links[level] = header.pre_hash;
            } else {
                links.push(header.pre_hash);
            }
        }
        Self(links)
    }

    /// Trie root over `(rlp(index), hash bytes)`.
    pub fn root(&self) -> Hash {
        derive_sha(self)
    }
}

impl Deref for InterLink {
    type Target = [Hash];

    fn deref(&self) -> &[Hash] {
        &self.0
    }
}

impl From<Vec<Hash>> for InterLink {
    fn from(links: Vec<Hash>) -> Self {
        Self(links)
    }
}

impl DerivableList for InterLink {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn key(&self, index: usize) -> Vec<u8> {
        index_key(index)
    }

    fn value(&self, index: usize) -> Vec<u8> {
        self.0[index].to_vec()
    }
}

impl Encodable for InterLink {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append_list::<Hash, _>(&self.0);
    }
}

impl Decodable for InterLink {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        rlp.as_list().map(Self)
    }
}

/// `⌊log2(target / hash)⌋`: how many times over the hash beat the target.
/// Zero for a zero hash or a hash above the target.
pub fn hash_level(hash: &Hash, target: &U256) -> usize {
    let h = hash.to_u256();
    if h.is_zero() || *target < h {
        return 0;
    }
    (*target / h).bits() - 1
}
