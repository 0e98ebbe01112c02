use std::sync::Arc;

use cb_state_trie::{derive_sha, index_key, DerivableList, EMPTY_TRIE_ROOT};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::Hash;

use super::interlink::InterLink;
use super::transaction::Transaction;
use super::verification::Verification;

/// Transactions, commit votes and inter-links of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub transactions: Vec<Arc<Transaction>>,
    pub verifications: Vec<Verification>,
    pub interlinks: InterLink,
}

impl Body {
    pub fn new(transactions: Vec<Transaction>, verifications: Vec<Verification>) -> Self {
        Self {
            transactions: transactions.into_iter().map(Arc::new).collect(),
            verifications,
            interlinks: InterLink::default(),
        }
    }

    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn tx_by_index(&self, index: usize) -> Option<&Arc<Transaction>> {
        self.transactions.get(index)
    }

    /// Root over `(tx id, rlp(tx))`.
    pub fn transaction_root(&self) -> Hash {
        transactions_root(&self.transactions)
    }

    /// Root over `(rlp(index), rlp(verification))`.
    pub fn verification_root(&self) -> Hash {
        verifications_root(&self.verifications)
    }

    /// Decode keeping votes that are not a [`super::vote::VoteMsg`] as
    /// opaque entries.
    pub fn decode_generic(rlp: &Rlp) -> Result<Self, DecoderError> {
        Self::decode_with(rlp, |item| Ok(Verification::decode_lenient(item)))
    }

    fn decode_with<F>(rlp: &Rlp, verification: F) -> Result<Self, DecoderError>
    where
        F: Fn(&Rlp) -> Result<Verification, DecoderError>,
    {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let transactions = rlp
            .at(0)?
            .iter()
            .map(|item| item.as_val::<Transaction>().map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let verifications = rlp
            .at(1)?
            .iter()
            .map(|item| verification(&item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            transactions,
            verifications,
            interlinks: rlp.val_at(2)?,
        })
    }
}

impl Encodable for Body {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.begin_list(self.transactions.len());
        for tx in &self.transactions {
            s.append(tx.as_ref());
        }
        s.append_list::<Verification, _>(&self.verifications);
        s.append(&self.interlinks);
    }
}

/// Strict decoding: every vote must be a [`super::vote::VoteMsg`].
impl Decodable for Body {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Self::decode_with(rlp, |item| item.as_val().map(Verification::Vote))
    }
}

struct TxList<'a>(&'a [Arc<Transaction>]);

impl DerivableList for TxList<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn key(&self, index: usize) -> Vec<u8> {
        self.0[index].cal_tx_id().to_vec()
    }

    fn value(&self, index: usize) -> Vec<u8> {
        rlp::encode(self.0[index].as_ref()).to_vec()
    }
}

struct VerificationList<'a>(&'a [Verification]);

impl DerivableList for VerificationList<'_> {
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

pub fn transactions_root(txs: &[Arc<Transaction>]) -> Hash {
    if txs.is_empty() {
        return EMPTY_TRIE_ROOT;
    }
    derive_sha(&TxList(txs))
}

pub fn verifications_root(verifications: &[Verification]) -> Hash {
    if verifications.is_empty() {
        return EMPTY_TRIE_ROOT;
    }
    derive_sha(&VerificationList(verifications))
}
