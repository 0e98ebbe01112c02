//! Execution receipts as held by transaction and block caches.

use cb_state_trie::{derive_sha, index_key, DerivableList};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{serde_hex, Address, Hash};

/// Outcome of executing one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(rename = "root", with = "serde_hex::bytes")]
    pub post_state: Vec<u8>,
    pub status: bool,
    #[serde(with = "serde_hex::quantity")]
    pub cumulative_gas_used: u64,
    #[serde(rename = "transactionHash")]
    pub tx_hash: Hash,
    pub contract_address: Address,
    #[serde(with = "serde_hex::quantity")]
    pub gas_used: u64,
}

/// Inputs to [`crate::Transaction::padding_receipt`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptParams {
    pub root: Vec<u8>,
    pub status: bool,
    pub cumulative_gas_used: u64,
    pub gas_used: u64,
}

// Consensus fields only; the rest is recomputable from the transaction.
impl Encodable for Receipt {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.post_state);
        s.append(&u64::from(self.status));
        s.append(&self.cumulative_gas_used);
    }
}

impl Decodable for Receipt {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let status: u64 = rlp.val_at(1)?;
        Ok(Self {
            post_state: rlp.val_at(0)?,
            status: status == 1,
            cumulative_gas_used: rlp.val_at(2)?,
            ..Self::default()
        })
    }
}

/// Receipts of one block in transaction order.
pub type Receipts = Vec<Receipt>;

struct ReceiptList<'a>(&'a [Receipt]);

impl DerivableList for ReceiptList<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn key(&self, index: usize) -> Vec<u8> {
        index_key(index)
    }

    fn value(&self, index: usize) -> Vec<u8> {
        rlp::encode(&self.0[index]).to_vec()
    }
}

/// Trie root committed as a header's receipt hash.
pub fn receipts_root(receipts: &[Receipt]) -> Hash {
    derive_sha(&ReceiptList(receipts))
}
