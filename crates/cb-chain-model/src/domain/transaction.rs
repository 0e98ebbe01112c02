//! # Transactions
//!
//! A transaction is a hashed body ([`TxData`]) plus a [`Witness`] holding the
//! signature. Its identity is `keccak256(rlp([body, sender]))`, so the ID is
//! only known once the sender has been recovered.
//!
//! ## Caches
//!
//! | Value | Slot | Written by |
//! |-------|------|------------|
//! | ID | `OnceLock` | first successful `cal_tx_id` |
//! | encoded size | `OnceLock` | decode or first `size` |
//! | sender | `RwLock<Option<_>>` | `sender`, keyed by signer |
//! | receipt, actual fee, index | `RwLock<Option<_>>` | block processing |
//!
//! Caches never change what is encoded; they are dropped by `sign`.

use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_crypto::{contract_address, keccak256, PublicKeyBytes, Secp256k1KeyPair};
use shared_types::{Address, AddressType, Hash, U256};
use tracing::{debug, info};

use super::message::Message;
use super::proofs::Proofs;
use super::receipt::{Receipt, ReceiptParams};
use super::signer::{derive_chain_id, Signer};
use super::vote::VoteMsg;
use crate::error::{ModelError, Result};

/// Gas charged for every transaction that does not create a contract.
pub const TX_GAS: u64 = 21_000;

/// Gas charged for a contract-creation transaction.
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;

/// Gas per zero byte of extra data.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Gas per non-zero byte of extra data.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// Gas a payload costs before execution.
pub fn intrinsic_gas(data: &[u8], contract_creation: bool) -> Result<u64> {
    let base = if contract_creation {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };
    let non_zero = data.iter().filter(|b| **b != 0).count() as u64;
    let zero = data.len() as u64 - non_zero;

    non_zero
        .checked_mul(TX_DATA_NON_ZERO_GAS)
        .and_then(|gas| gas.checked_add(base))
        .and_then(|gas| zero.checked_mul(TX_DATA_ZERO_GAS)?.checked_add(gas))
        .ok_or(ModelError::OutOfGas)
}

/// Signed part of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxData {
    pub account_nonce: u64,
    /// `None` deploys a contract
    pub recipient: Option<Address>,
    pub hash_lock: Option<Hash>,
    pub time_lock: U256,
    pub amount: U256,
    pub price: U256,
    pub gas_limit: u64,
    pub extra_data: Vec<u8>,
}

impl Encodable for TxData {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(8);
        s.append(&self.account_nonce);
        match &self.recipient {
            Some(to) => s.append(to),
            None => s.append_empty_data(),
        };
        match &self.hash_lock {
            Some(lock) => s.append(lock),
            None => s.append_empty_data(),
        };
        s.append(&self.time_lock);
        s.append(&self.amount);
        s.append(&self.price);
        s.append(&self.gas_limit);
        s.append(&self.extra_data);
    }
}

fn optional<T: Decodable>(rlp: &Rlp, index: usize) -> std::result::Result<Option<T>, DecoderError> {
    let item = rlp.at(index)?;
    if item.is_data() && item.is_empty() {
        Ok(None)
    } else {
        item.as_val().map(Some)
    }
}

impl Decodable for TxData {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 8 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            account_nonce: rlp.val_at(0)?,
            recipient: optional(rlp, 1)?,
            hash_lock: optional(rlp, 2)?,
            time_lock: rlp.val_at(3)?,
            amount: rlp.val_at(4)?,
            price: rlp.val_at(5)?,
            gas_limit: rlp.val_at(6)?,
            extra_data: rlp.val_at(7)?,
        })
    }
}

/// Signature values and the hash-lock preimage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    pub r: U256,
    pub s: U256,
    /// Recovery id with the chain offset applied
    pub v: U256,
    pub hash_key: Vec<u8>,
}

impl Encodable for Witness {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.r);
        s.append(&self.s);
        s.append(&self.v);
        s.append(&self.hash_key);
    }
}

impl Decodable for Witness {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            r: rlp.val_at(0)?,
            s: rlp.val_at(1)?,
            v: rlp.val_at(2)?,
            hash_key: rlp.val_at(3)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SenderCache {
    signer: Signer,
    address: Address,
}

/// A signed (or not yet signed) transaction.
#[derive(Debug, Default)]
pub struct Transaction {
    data: TxData,
    wit: Witness,

    hash: OnceLock<Hash>,
    size: OnceLock<usize>,
    from: RwLock<Option<SenderCache>>,

    receipt: RwLock<Option<Receipt>>,
    tx_index: RwLock<Option<usize>>,
    actual_fee: RwLock<Option<U256>>,
}

impl Transaction {
    /// Unsigned transaction from its parts.
    pub fn from_parts(data: TxData, wit: Witness) -> Self {
        Self {
            data,
            wit,
            ..Self::default()
        }
    }

    /// Transfer or call with explicit gas terms.
    pub fn new(
        nonce: u64,
        to: Address,
        amount: U256,
        gas_price: U256,
        gas_limit: u64,
        data: Vec<u8>,
    ) -> Self {
        Self::from_parts(
            TxData {
                account_nonce: nonce,
                recipient: Some(to),
                amount,
                price: gas_price,
                gas_limit,
                extra_data: data,
                ..TxData::default()
            },
            Witness::default(),
        )
    }

    /// Contract deployment; `data` is the init code.
    pub fn new_contract_creation(
        nonce: u64,
        amount: U256,
        gas_price: U256,
        gas_limit: u64,
        data: Vec<u8>,
    ) -> Self {
        Self::from_parts(
            TxData {
                account_nonce: nonce,
                recipient: None,
                amount,
                price: gas_price,
                gas_limit,
                extra_data: data,
                ..TxData::default()
            },
            Witness::default(),
        )
    }

    /// Transfer priced by a flat fee: the gas limit is the intrinsic gas of
    /// `data` and the price is `fee / gas_limit`.
    pub fn new_with_fee(
        nonce: u64,
        to: Address,
        amount: U256,
        fee: U256,
        data: Vec<u8>,
    ) -> Result<Self> {
        let gas_limit = intrinsic_gas(&data, false)?;
        let gas_price = fee / U256::from(gas_limit);
        Ok(Self::new(nonce, to, amount, gas_price, gas_limit, data))
    }

    /// Stake `amount` to become a verifier candidate.
    pub fn new_register(nonce: u64, amount: U256, gas_price: U256, gas_limit: u64) -> Self {
        Self::new(nonce, Address::stake(), amount, gas_price, gas_limit, Vec::new())
    }

    pub fn new_unstake(nonce: u64, gas_price: U256, gas_limit: u64) -> Self {
        Self::new(nonce, Address::unstake(), U256::zero(), gas_price, gas_limit, Vec::new())
    }

    pub fn new_cancel(nonce: u64, gas_price: U256, gas_limit: u64) -> Self {
        Self::new(nonce, Address::cancel(), U256::zero(), gas_price, gas_limit, Vec::new())
    }

    /// Report two conflicting votes cast by `target`.
    pub fn new_evidence(
        nonce: u64,
        gas_price: U256,
        gas_limit: u64,
        target: &Address,
        vote_a: VoteMsg,
        vote_b: VoteMsg,
    ) -> Self {
        let proofs = rlp::encode(&Proofs::new(vote_a, vote_b)).to_vec();
        Self::new(
            nonce,
            target.evidence_of(),
            U256::zero(),
            gas_price,
            gas_limit,
            proofs,
        )
    }

    pub fn data(&self) -> &TxData {
        &self.data
    }

    pub fn witness(&self) -> &Witness {
        &self.wit
    }

    pub fn nonce(&self) -> u64 {
        self.data.account_nonce
    }

    pub fn to(&self) -> Option<Address> {
        self.data.recipient
    }

    pub fn hash_lock(&self) -> Option<Hash> {
        self.data.hash_lock
    }

    pub fn time_lock(&self) -> U256 {
        self.data.time_lock
    }

    pub fn amount(&self) -> U256 {
        self.data.amount
    }

    pub fn gas_price(&self) -> U256 {
        self.data.price
    }

    pub fn gas_limit(&self) -> u64 {
        self.data.gas_limit
    }

    pub fn extra_data(&self) -> &[u8] {
        &self.data.extra_data
    }

    pub fn hash_key(&self) -> &[u8] {
        &self.wit.hash_key
    }

    /// `(v, r, s)` as stored.
    pub fn raw_signature_values(&self) -> (U256, U256, U256) {
        (self.wit.v, self.wit.r, self.wit.s)
    }

    /// Routing type of the recipient; contract creation when absent.
    pub fn tx_type(&self) -> AddressType {
        self.data
            .recipient
            .map_or(AddressType::ContractCreate, |to| to.address_type())
    }

    pub fn is_contract_creation(&self) -> bool {
        self.data.recipient.is_none()
    }

    /// Chain id implied by the stored `v`.
    pub fn chain_id(&self) -> U256 {
        derive_chain_id(&self.wit.v)
    }

    /// Signer for the chain this transaction was signed on.
    pub fn signer(&self) -> Signer {
        Signer::new(self.chain_id())
    }

    /// Sign the body for `signer`'s chain, keeping the hash key. Every cache
    /// of the unsigned value is dropped.
    pub fn sign(self, key: &Secp256k1KeyPair, signer: &Signer) -> Result<Self> {
        let Transaction { data, wit, .. } = self;
        let sig = key.sign_recoverable(&signer.sign_hash(&data))?;
        let (r, s, v) = signer.signature_values(&sig);
        Ok(Self::from_parts(
            data,
            Witness {
                r,
                s,
                v,
                hash_key: wit.hash_key,
            },
        ))
    }

    /// Recovered sender. `None` uses [`Transaction::signer`]. The result is
    /// cached together with the signer that produced it.
    pub fn sender(&self, signer: Option<&Signer>) -> Result<Address> {
        let signer = signer.copied().unwrap_or_else(|| self.signer());
        if let Some(cached) = *self.from.read() {
            if cached.signer == signer {
                return Ok(cached.address);
            }
        }

        let address = signer.sender(self)?;
        *self.from.write() = Some(SenderCache { signer, address });
        Ok(address)
    }

    pub fn sender_public_key(&self, signer: Option<&Signer>) -> Result<PublicKeyBytes> {
        let signer = signer.copied().unwrap_or_else(|| self.signer());
        Ok(signer.sender_public_key(self)?)
    }

    /// Transaction ID. The zero hash when the sender cannot be recovered; that
    /// result is not cached.
    pub fn cal_tx_id(&self) -> Hash {
        if let Some(id) = self.hash.get() {
            return *id;
        }
        let sender = match self.sender(None) {
            Ok(sender) => sender,
            Err(e) => {
                debug!(error = %e, nonce = self.data.account_nonce, "tx id unavailable");
                return Hash::ZERO;
            }
        };

        let mut stream = RlpStream::new_list(2);
        stream.append(&self.data).append(&sender);
        let id = keccak256(&stream.out());
        let _ = self.hash.set(id);
        id
    }

    /// Length of the canonical encoding.
    pub fn size(&self) -> usize {
        *self.size.get_or_init(|| rlp::encode(self).len())
    }

    /// Upper bound of what the sender pays: `gas_price * gas_limit + amount`.
    pub fn cost(&self) -> U256 {
        self.fee().saturating_add(self.data.amount)
    }

    /// `gas_price * gas_limit`
    pub fn fee(&self) -> U256 {
        self.data
            .price
            .saturating_mul(U256::from(self.data.gas_limit))
    }

    /// Encoded size at a rate of one unit per byte.
    pub fn estimate_fee(&self) -> U256 {
        U256::from(rlp::encode(self).len())
    }

    pub fn as_message(&self, check_nonce: bool) -> Result<Message> {
        Ok(Message::new(
            self.sender(None)?,
            self.data.recipient,
            self.data.account_nonce,
            self.data.amount,
            self.data.gas_limit,
            self.data.price,
            self.data.extra_data.clone(),
            check_nonce,
        ))
    }

    /// Build and cache the receipt of this transaction.
    pub fn padding_receipt(&self, params: ReceiptParams) -> Result<Receipt> {
        debug!(status = params.status, gas_used = params.gas_used, "padding receipt");
        let contract_address = match self.data.recipient {
            None => contract_address(&self.sender(None)?, self.data.account_nonce),
            Some(to) => to,
        };
        let receipt = Receipt {
            post_state: params.root,
            status: params.status,
            cumulative_gas_used: params.cumulative_gas_used,
            tx_hash: self.cal_tx_id(),
            contract_address,
            gas_used: params.gas_used,
        };
        *self.receipt.write() = Some(receipt.clone());
        Ok(receipt)
    }

    pub fn receipt(&self) -> Result<Receipt> {
        self.receipt.read().clone().ok_or(ModelError::ReceiptNotSet)
    }

    /// Record the fee charged after execution. Only contract transactions
    /// keep it; for the rest this is a no-op.
    pub fn padding_actual_tx_fee(&self, fee: U256) {
        if !self.tx_type().is_contract() {
            info!(tx_type = %self.tx_type(), "the tx isn't contract transaction");
            return;
        }
        *self.actual_fee.write() = Some(fee);
    }

    pub fn actual_tx_fee(&self) -> Option<U256> {
        *self.actual_fee.read()
    }

    pub fn padding_tx_index(&self, index: usize) {
        *self.tx_index.write() = Some(index);
    }

    pub fn tx_index(&self) -> Result<usize> {
        self.tx_index.read().ok_or(ModelError::TxIndexNotSet)
    }
}

impl Clone for Transaction {
    fn clone(&self) -> Self {
        let copy = Self::from_parts(self.data.clone(), self.wit.clone());
        if let Some(id) = self.hash.get() {
            let _ = copy.hash.set(*id);
        }
        if let Some(size) = self.size.get() {
            let _ = copy.size.set(*size);
        }
        *copy.from.write() = *self.from.read();
        *copy.receipt.write() = self.receipt.read().clone();
        *copy.tx_index.write() = *self.tx_index.read();
        *copy.actual_fee.write() = *self.actual_fee.read();
        copy
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.wit == other.wit
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to = self
            .data
            .recipient
            .map_or_else(|| "[contract creation]".to_string(), |to| to.hex());
        write!(
            f,
            "tx {} type={} to={} nonce={} gas_price={} gas_limit={} amount={}",
            self.cal_tx_id(),
            self.tx_type(),
            to,
            self.data.account_nonce,
            self.data.price,
            self.data.gas_limit,
            self.data.amount
        )
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.data);
        s.append(&self.wit);
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let tx = Self::from_parts(rlp.val_at(0)?, rlp.val_at(1)?);
        let _ = tx.size.set(rlp.as_raw().len());
        Ok(tx)
    }
}
