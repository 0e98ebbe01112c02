//! # Block
//!
//! A block owns its header and body exclusively. Construction derives the
//! transaction and verification roots; [`Block::new_with_link`] also extends
//! the parent's inter-link and writes its root.
//!
//! The block hash is cached on first read. Setters that touch hashed header
//! fields leave the cache alone; callers refresh it with
//! [`Block::refresh_hash_cache`] once the header is final.

use std::fmt;
use std::sync::Arc;

use cb_bloom_filters::{derive_config, Bloom};
use cb_telemetry::log_block_event;
use parking_lot::{Mutex, RwLock};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::{Address, BlockNonce, Difficulty, Hash, U256};

use super::body::Body;
use super::header::Header;
use super::interlink::InterLink;
use super::receipt::Receipts;
use super::transaction::Transaction;
use super::verification::Verification;
use crate::error::{ModelError, Result};
use crate::work_map::{run_work_map, WorkOperation};
use crate::SUBSYSTEM;

#[derive(Debug, Default)]
pub struct Block {
    header: Header,
    body: Body,

    hash: RwLock<Option<Hash>>,
    size: RwLock<Option<usize>>,
    receipts: RwLock<Option<Receipts>>,
}

impl Block {
    /// Block over a copy of `header` with the transaction and verification
    /// roots written from `txs` and `verifications`.
    pub fn new(header: &Header, txs: Vec<Transaction>, verifications: Vec<Verification>) -> Self {
        let body = Body::new(txs, verifications);
        let mut header = header.clone();
        header.transaction_root = body.transaction_root();
        header.verification_root = body.verification_root();

        log_block_event!(
            debug,
            SUBSYSTEM,
            "block built",
            header.number,
            header.hash(),
            tx_count = body.tx_count(),
            txs_root = %header.transaction_root,
            verification_root = %header.verification_root
        );

        Self::from_parts(header, body)
    }

    /// Like [`Block::new`], and also derives the inter-link from the parent's
    /// `prev_link`.
    pub fn new_with_link(
        header: &Header,
        txs: Vec<Transaction>,
        verifications: Vec<Verification>,
        prev_link: &InterLink,
    ) -> Self {
        let mut block = Self::new(header, txs, verifications);
        let link = InterLink::next(prev_link, &block.header);
        block.set_interlink_root(link.root());
        block.set_interlinks(link);
        block
    }

    /// Assemble a block without touching any root.
    pub fn from_parts(header: Header, body: Body) -> Self {
        Self {
            header,
            body,
            ..Self::default()
        }
    }

    // === Identity ===

    pub fn hash(&self) -> Hash {
        if let Some(hash) = *self.hash.read() {
            return hash;
        }
        self.refresh_hash_cache()
    }

    /// Recompute and store the block hash.
    pub fn refresh_hash_cache(&self) -> Hash {
        let hash = self.header.hash();
        *self.hash.write() = Some(hash);
        hash
    }

    /// Length of the canonical encoding.
    pub fn size(&self) -> usize {
        if let Some(size) = *self.size.read() {
            return size;
        }
        let size = rlp::encode(self).len();
        *self.size.write() = Some(size);
        size
    }

    pub fn is_special(&self) -> bool {
        self.header.is_special()
    }

    // === Header view ===

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> u64 {
        self.header.version
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn pre_hash(&self) -> Hash {
        self.header.pre_hash
    }

    pub fn seed(&self) -> Hash {
        self.header.seed
    }

    pub fn timestamp(&self) -> U256 {
        self.header.timestamp
    }

    pub fn coinbase(&self) -> Address {
        self.header.coinbase
    }

    pub fn nonce(&self) -> BlockNonce {
        self.header.nonce
    }

    pub fn difficulty(&self) -> Difficulty {
        self.header.diff
    }

    pub fn gas_limit(&self) -> u64 {
        self.header.gas_limit
    }

    pub fn gas_used(&self) -> u64 {
        self.header.gas_used
    }

    pub fn bloom(&self) -> &Bloom {
        &self.header.bloom
    }

    pub fn tx_root(&self) -> Hash {
        self.header.transaction_root
    }

    pub fn state_root(&self) -> Hash {
        self.header.state_root
    }

    pub fn verification_root(&self) -> Hash {
        self.header.verification_root
    }

    pub fn interlink_root(&self) -> Hash {
        self.header.interlink_root
    }

    pub fn register_root(&self) -> Hash {
        self.header.register_root
    }

    pub fn receipt_hash(&self) -> Hash {
        self.header.receipt_hash
    }

    // === Body view ===

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.body.transactions
    }

    pub fn tx_count(&self) -> usize {
        self.body.tx_count()
    }

    pub fn verifications(&self) -> &[Verification] {
        &self.body.verifications
    }

    pub fn interlinks(&self) -> &InterLink {
        &self.body.interlinks
    }

    /// Transaction whose ID is `id`.
    pub fn transaction(&self, id: &Hash) -> Option<&Arc<Transaction>> {
        self.body
            .transactions
            .iter()
            .find(|tx| tx.cal_tx_id() == *id)
    }

    /// Visit transactions in order, stopping at the first error.
    pub fn tx_iterator<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &Arc<Transaction>) -> Result<()>,
    {
        self.body
            .transactions
            .iter()
            .enumerate()
            .try_for_each(|(i, tx)| visit(i, tx))
    }

    /// Visit verifications in order, stopping at the first error.
    pub fn vers_iterator<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &Verification, &Block) -> Result<()>,
    {
        self.body
            .verifications
            .iter()
            .enumerate()
            .try_for_each(|(i, v)| visit(i, v, self))
    }

    /// Sum of what the block's transactions pay: the settled fee for
    /// contract transactions, `gas_price * gas_limit` for the rest. Fails on
    /// a contract transaction whose fee was never settled.
    pub fn get_transaction_fees(&self) -> Result<U256> {
        self.body
            .transactions
            .iter()
            .try_fold(U256::zero(), |total, tx| {
                let fee = if tx.tx_type().is_contract() {
                    tx.actual_tx_fee()
                        .ok_or_else(|| ModelError::ContractFeeNotSettled(tx.cal_tx_id()))?
                } else {
                    tx.fee()
                };
                Ok(total.saturating_add(fee))
            })
    }

    /// Bloom over the transaction IDs, sized for the transaction count.
    pub fn get_block_txs_bloom(&self) -> Bloom {
        let mut bloom = Bloom::new(derive_config(self.tx_count()));
        for tx in &self.body.transactions {
            bloom.digest(tx.cal_tx_id().as_bytes());
        }
        bloom
    }

    /// Same filter as [`Block::get_block_txs_bloom`], digesting in parallel
    /// once the block holds more than `default_txs` transactions.
    pub fn encode_txs_bloom(&self, default_txs: usize) -> Result<Bloom> {
        if self.tx_count() <= default_txs {
            return Ok(self.get_block_txs_bloom());
        }
        let op = TxIdDigest(Mutex::new(Bloom::new(derive_config(self.tx_count()))));
        run_work_map(&op, &self.body.transactions)?;
        Ok(op.0.into_inner())
    }

    // === Setters ===

    pub fn set_nonce(&mut self, nonce: BlockNonce) {
        self.header.nonce = nonce;
        self.clear_size();
    }

    pub fn set_difficulty(&mut self, diff: Difficulty) {
        self.header.diff = diff;
        self.clear_size();
    }

    pub fn set_timestamp(&mut self, timestamp: U256) {
        self.header.timestamp = timestamp;
        self.clear_size();
    }

    pub fn set_state_root(&mut self, root: Hash) {
        self.header.state_root = root;
    }

    pub fn set_register_root(&mut self, root: Hash) {
        self.header.register_root = root;
    }

    pub fn set_receipt_hash(&mut self, hash: Hash) {
        self.header.receipt_hash = hash;
    }

    pub fn set_interlink_root(&mut self, root: Hash) {
        self.header.interlink_root = root;
    }

    pub fn set_interlinks(&mut self, link: InterLink) {
        self.body.interlinks = link;
        self.clear_size();
    }

    pub fn set_verifications(&mut self, verifications: Vec<Verification>) {
        self.body.verifications = verifications;
        self.clear_size();
    }

    pub fn padding_receipts(&self, receipts: Receipts) {
        *self.receipts.write() = Some(receipts);
    }

    pub fn receipts(&self) -> Result<Receipts> {
        self.receipts
            .read()
            .clone()
            .ok_or(ModelError::BlockReceiptsEmpty)
    }

    /// Decode keeping non-vote verifications as opaque entries.
    pub fn decode_generic(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        Self::decode_with(rlp, Body::decode_generic)
    }

    pub(crate) fn decode_with<F>(rlp: &Rlp, body: F) -> std::result::Result<Self, DecoderError>
    where
        F: FnOnce(&Rlp) -> std::result::Result<Body, DecoderError>,
    {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let block = Self::from_parts(rlp.val_at(0)?, body(&rlp.at(1)?)?);
        *block.size.write() = Some(rlp.as_raw().len());
        Ok(block)
    }

    fn clear_size(&mut self) {
        *self.size.get_mut() = None;
    }
}

struct TxIdDigest(Mutex<Bloom>);

impl WorkOperation for TxIdDigest {
    fn do_task(&self, tx: &Transaction) -> Result<()> {
        let id = tx.cal_tx_id();
        self.0.lock().digest(id.as_bytes());
        Ok(())
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            body: self.body.clone(),
            hash: RwLock::new(*self.hash.read()),
            size: RwLock::new(*self.size.read()),
            receipts: RwLock::new(self.receipts.read().clone()),
        }
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.body == other.body
    }
}

impl Eq for Block {}

impl Encodable for Block {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.header);
        s.append(&self.body);
    }
}

impl Decodable for Block {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        Self::decode_with(rlp, Body::decode)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block({})", self.hash())?;
        writeln!(f, "{}", self.header)?;
        writeln!(f, "  transactions:      {}", self.tx_count())?;
        writeln!(f, "  verifications:     {}", self.body.verifications.len())?;
        write!(f, "  interlinks:        {}", self.body.interlinks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signer::Signer;
    use crate::domain::transaction::TX_GAS;
    use crate::domain::vote::{VoteMsg, VoteMsgType};
    use cb_state_trie::EMPTY_TRIE_ROOT;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::AddressType;

    fn key() -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_bytes([0x11; 32]).unwrap()
    }

    fn header(number: u64) -> Header {
        Header::new(
            1,
            number,
            Hash([0x0f; 32]),
            Hash([0x5e; 32]),
            Difficulty::from_compact(0x1e00_ffff),
            U256::from(1_700_000_000_000_000_000u64),
            key().address(),
            BlockNonce::from_u64(3),
        )
    }

    fn transfers(count: u64, gas_limit: u64) -> Vec<Transaction> {
        let to = Address::with_type(AddressType::Normal, &[0xbb; 20]);
        (0..count)
            .map(|nonce| {
                Transaction::new(nonce, to, U256::from(10), U256::one(), gas_limit, vec![])
                    .sign(&key(), &Signer::new(1u64))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_block_roots() {
        let block = Block::new(&header(5), vec![], vec![]);
        assert_eq!(block.tx_root(), EMPTY_TRIE_ROOT);
        assert_eq!(block.verification_root(), EMPTY_TRIE_ROOT);
        assert_eq!(block.interlink_root(), Hash::ZERO);
    }

    #[test]
    fn test_roots_written() {
        let vote: Verification = VoteMsg::signed_by(4, 0, Hash([1; 32]), VoteMsgType::Vote, &key())
            .unwrap()
            .into();
        let block = Block::new(&header(5), transfers(3, TX_GAS), vec![vote]);
        assert_eq!(block.tx_root(), block.body().transaction_root());
        assert_eq!(block.verification_root(), block.body().verification_root());
        assert_ne!(block.tx_root(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_transaction_fees() {
        let block = Block::new(&header(2), transfers(10, TX_GAS), vec![]);
        assert_eq!(block.get_transaction_fees(), Ok(U256::from(210_000)));

        let block = Block::new(&header(2), transfers(1, 42_000), vec![]);
        assert_eq!(block.get_transaction_fees(), Ok(U256::from(42_000)));
    }

    #[test]
    fn test_contract_fee_uses_settled_amount() {
        let create = Transaction::new_contract_creation(0, U256::zero(), U256::from(2), 100_000, vec![1])
            .sign(&key(), &Signer::new(1u64))
            .unwrap();
        let id = create.cal_tx_id();
        let mut txs = transfers(2, TX_GAS);
        txs.push(create);
        let block = Block::new(&header(2), txs, vec![]);

        // the gas limit is never charged in place of a missing settlement
        assert_eq!(
            block.get_transaction_fees(),
            Err(ModelError::ContractFeeNotSettled(id))
        );

        block.transactions()[2].padding_actual_tx_fee(U256::from(777));
        assert_eq!(block.get_transaction_fees(), Ok(U256::from(2 * 21_000 + 777)));
    }

    #[test]
    fn test_interlink_at_height_one() {
        let h = header(1);
        let block = Block::new_with_link(&h, vec![], vec![], &InterLink::default());
        assert_eq!(block.interlinks().0, vec![h.pre_hash, h.pre_hash]);
        assert_eq!(block.interlink_root(), block.interlinks().root());
    }

    #[test]
    fn test_hash_cache_refresh() {
        let mut block = Block::new(&header(7), vec![], vec![]);
        let before = block.hash();
        block.set_nonce(BlockNonce::from_u64(99));
        assert_eq!(block.hash(), before);
        let after = block.refresh_hash_cache();
        assert_ne!(after, before);
        assert_eq!(block.hash(), block.header().hash());
    }

    #[test]
    fn test_lookup_and_iterators() {
        let block = Block::new(&header(3), transfers(4, TX_GAS), vec![]);
        let id = block.transactions()[2].cal_tx_id();
        assert_eq!(block.transaction(&id).map(|tx| tx.nonce()), Some(2));
        assert!(block.transaction(&Hash([0xee; 32])).is_none());

        let mut seen = Vec::new();
        let result = block.tx_iterator(|i, _| {
            seen.push(i);
            if i == 1 {
                return Err(ModelError::OutOfGas);
            }
            Ok(())
        });
        assert_eq!(result, Err(ModelError::OutOfGas));
        assert_eq!(seen, vec![0, 1]);
        assert!(block.vers_iterator(|_, _, _| Ok(())).is_ok());
    }

    #[test]
    fn test_parallel_bloom_matches_sequential() {
        let block = Block::new(&header(3), transfers(12, TX_GAS), vec![]);
        let sequential = block.get_block_txs_bloom();
        assert_eq!(block.encode_txs_bloom(4).unwrap(), sequential);
        for tx in block.transactions() {
            assert!(sequential.lookup(tx.cal_tx_id().as_bytes()));
        }
    }

    #[test]
    fn test_receipts_cache() {
        let block = Block::new(&header(3), vec![], vec![]);
        assert_eq!(block.receipts(), Err(ModelError::BlockReceiptsEmpty));
        block.padding_receipts(Vec::new());
        assert_eq!(block.receipts(), Ok(Vec::new()));
    }

    #[test]
    fn test_rlp_round_trip() {
        let vote: Verification = VoteMsg::signed_by(2, 1, Hash([1; 32]), VoteMsgType::Vote, &key())
            .unwrap()
            .into();
        let block = Block::new_with_link(&header(1), transfers(2, TX_GAS), vec![vote], &InterLink::default());
        let bytes = rlp::encode(&block);
        let decoded: Block = rlp::decode(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.hash(), block.hash());
        assert_eq!(decoded.size(), bytes.len());
        for (a, b) in decoded.transactions().iter().zip(block.transactions()) {
            assert_eq!(a.cal_tx_id(), b.cal_tx_id());
        }
    }
}
