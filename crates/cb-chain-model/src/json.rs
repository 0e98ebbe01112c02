//! # Text encoding
//!
//! Headers, bodies, blocks and transactions go through private shape structs
//! whose fields are all optional, so a missing key is reported by name
//! instead of as a generic serde error. Integers are `0x`-prefixed hex.
//!
//! | Value | Required keys |
//! |-------|---------------|
//! | Header | every field |
//! | Block | `header`, `body` |
//! | Transaction | `txdata.nonce`, `txdata.value`, `txdata.input`, `witness.r/s/v` |
//!
//! A decoded transaction must carry signature values in range for the chain
//! its `v` names; unsigned transactions do not survive a JSON round trip.

use std::sync::Arc;

use cb_bloom_filters::Bloom;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_crypto::valid_sig_value;
use shared_types::{serde_hex, Address, BlockNonce, Difficulty, Hash, U256};

use crate::domain::{
    derive_chain_id, Block, Body, Header, InterLink, Transaction, TxData, Verification, VoteMsg,
    Witness, V_OFFSET,
};
use crate::error::{ModelError, Result};

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct HexBytes(#[serde(with = "serde_hex::bytes")] Vec<u8>);

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
struct Quantity(#[serde(with = "serde_hex::quantity")] u64);

fn required<T>(value: Option<T>, field: &str, owner: &str) -> Result<T> {
    value.ok_or_else(|| ModelError::Json(format!("missing required field '{field}' for {owner}")))
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| ModelError::Json(e.to_string()))
}

/// Serialise any model value as JSON text.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ModelError::Json(e.to_string()))
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct HeaderJson {
    version: Option<Quantity>,
    number: Option<Quantity>,
    seed: Option<Hash>,
    proof: Option<HexBytes>,
    miner_pub_key: Option<HexBytes>,
    pre_hash: Option<Hash>,
    diff: Option<Difficulty>,
    timestamp: Option<U256>,
    coinbase: Option<Address>,
    #[serde(rename = "gasLimit")]
    gas_limit: Option<Quantity>,
    #[serde(rename = "gasUsed")]
    gas_used: Option<Quantity>,
    nonce: Option<BlockNonce>,
    #[serde(rename = "Bloom")]
    bloom: Option<Bloom>,
    #[serde(rename = "txs_root")]
    transaction_root: Option<Hash>,
    state_root: Option<Hash>,
    verification_root: Option<Hash>,
    interlink_root: Option<Hash>,
    register_root: Option<Hash>,
    #[serde(rename = "receiptsRoot")]
    receipt_hash: Option<Hash>,
}

impl From<&Header> for HeaderJson {
    fn from(h: &Header) -> Self {
        Self {
            version: Some(Quantity(h.version)),
            number: Some(Quantity(h.number)),
            seed: Some(h.seed),
            proof: Some(HexBytes(h.proof.clone())),
            miner_pub_key: Some(HexBytes(h.miner_pub_key.clone())),
            pre_hash: Some(h.pre_hash),
            diff: Some(h.diff),
            timestamp: Some(h.timestamp),
            coinbase: Some(h.coinbase),
            gas_limit: Some(Quantity(h.gas_limit)),
            gas_used: Some(Quantity(h.gas_used)),
            nonce: Some(h.nonce),
            bloom: Some(h.bloom.clone()),
            transaction_root: Some(h.transaction_root),
            state_root: Some(h.state_root),
            verification_root: Some(h.verification_root),
            interlink_root: Some(h.interlink_root),
            register_root: Some(h.register_root),
            receipt_hash: Some(h.receipt_hash),
        }
    }
}

impl TryFrom<HeaderJson> for Header {
    type Error = ModelError;

    fn try_from(j: HeaderJson) -> Result<Self> {
        const OWNER: &str = "Header";
        Ok(Header {
            version: required(j.version, "version", OWNER)?.0,
            number: required(j.number, "number", OWNER)?.0,
            seed: required(j.seed, "seed", OWNER)?,
            proof: required(j.proof, "proof", OWNER)?.0,
            miner_pub_key: required(j.miner_pub_key, "miner_pub_key", OWNER)?.0,
            pre_hash: required(j.pre_hash, "pre_hash", OWNER)?,
            diff: required(j.diff, "diff", OWNER)?,
            timestamp: required(j.timestamp, "timestamp", OWNER)?,
            coinbase: required(j.coinbase, "coinbase", OWNER)?,
            gas_limit: required(j.gas_limit, "gasLimit", OWNER)?.0,
            gas_used: required(j.gas_used, "gasUsed", OWNER)?.0,
            nonce: required(j.nonce, "nonce", OWNER)?,
            bloom: required(j.bloom, "Bloom", OWNER)?,
            transaction_root: required(j.transaction_root, "txs_root", OWNER)?,
            state_root: required(j.state_root, "state_root", OWNER)?,
            verification_root: required(j.verification_root, "verification_root", OWNER)?,
            interlink_root: required(j.interlink_root, "interlink_root", OWNER)?,
            register_root: required(j.register_root, "register_root", OWNER)?,
            receipt_hash: required(j.receipt_hash, "receiptsRoot", OWNER)?,
        })
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        HeaderJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        HeaderJson::deserialize(deserializer)?
            .try_into()
            .map_err(D::Error::custom)
    }
}

pub fn header_from_json(text: &str) -> Result<Header> {
    parse::<HeaderJson>(text)?.try_into()
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct TxDataJson {
    nonce: Option<Quantity>,
    to: Option<Address>,
    hashlock: Option<Hash>,
    timelock: Option<U256>,
    value: Option<U256>,
    #[serde(rename = "gasPrice")]
    gas_price: Option<U256>,
    gas: Option<Quantity>,
    input: Option<HexBytes>,
}

#[derive(Serialize, Deserialize)]
struct WitnessJson {
    r: Option<U256>,
    s: Option<U256>,
    v: Option<U256>,
    hashkey: Option<HexBytes>,
}

#[derive(Serialize, Deserialize)]
struct TransactionJson {
    txdata: Option<TxDataJson>,
    witness: Option<WitnessJson>,
}

impl From<&Transaction> for TransactionJson {
    fn from(tx: &Transaction) -> Self {
        let data = tx.data();
        let wit = tx.witness();
        Self {
            txdata: Some(TxDataJson {
                nonce: Some(Quantity(data.account_nonce)),
                to: data.recipient,
                hashlock: data.hash_lock,
                timelock: Some(data.time_lock),
                value: Some(data.amount),
                gas_price: Some(data.price),
                gas: Some(Quantity(data.gas_limit)),
                input: Some(HexBytes(data.extra_data.clone())),
            }),
            witness: Some(WitnessJson {
                r: Some(wit.r),
                s: Some(wit.s),
                v: Some(wit.v),
                hashkey: Some(HexBytes(wit.hash_key.clone())),
            }),
        }
    }
}

impl TryFrom<TransactionJson> for Transaction {
    type Error = ModelError;

    fn try_from(j: TransactionJson) -> Result<Self> {
        let d = required(j.txdata, "txdata", "Transaction")?;
        let w = required(j.witness, "witness", "Transaction")?;

        let data = TxData {
            account_nonce: required(d.nonce, "nonce", "txData")?.0,
            recipient: d.to,
            hash_lock: d.hashlock,
            time_lock: d.timelock.unwrap_or_default(),
            amount: required(d.value, "value", "txData")?,
            price: d.gas_price.unwrap_or_default(),
            gas_limit: d.gas.map_or(0, |q| q.0),
            extra_data: required(d.input, "input", "txData")?.0,
        };
        let wit = Witness {
            r: required(w.r, "r", "witness")?,
            s: required(w.s, "s", "witness")?,
            v: required(w.v, "v", "witness")?,
            hash_key: w.hashkey.map(|b| b.0).unwrap_or_default(),
        };
        check_signature_values(&wit)?;
        Ok(Transaction::from_parts(data, wit))
    }
}

// The recovery id left after removing the chain offset must be 0 or 1
fn check_signature_values(wit: &Witness) -> Result<()> {
    let chain_id = derive_chain_id(&wit.v);
    let recovery = wit
        .v
        .checked_sub(chain_id.saturating_mul(U256::from(2)))
        .and_then(|v| v.checked_sub(U256::from(V_OFFSET)));
    match recovery {
        Some(v) if valid_sig_value(&wit.r, &wit.s, &v) => Ok(()),
        _ => Err(ModelError::JsonInvalidSignature),
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        TransactionJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        TransactionJson::deserialize(deserializer)?
            .try_into()
            .map_err(D::Error::custom)
    }
}

pub fn transaction_from_json(text: &str) -> Result<Transaction> {
    parse::<TransactionJson>(text)?.try_into()
}

// ---------------------------------------------------------------------------
// Body and block
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct BodyRef<'a> {
    transactions: Vec<&'a Transaction>,
    commit_msg: &'a [Verification],
    interlinks: &'a InterLink,
}

#[derive(Deserialize)]
#[serde(bound = "V: DeserializeOwned")]
struct BodyJson<V> {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    commit_msg: Vec<V>,
    #[serde(default)]
    interlinks: InterLink,
}

impl<V: Into<Verification>> From<BodyJson<V>> for Body {
    fn from(j: BodyJson<V>) -> Self {
        Body {
            transactions: j.transactions.into_iter().map(Arc::new).collect(),
            verifications: j.commit_msg.into_iter().map(Into::into).collect(),
            interlinks: j.interlinks,
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        BodyRef {
            transactions: self.transactions.iter().map(AsRef::as_ref).collect(),
            commit_msg: &self.verifications,
            interlinks: &self.interlinks,
        }
        .serialize(serializer)
    }
}

/// Every `commit_msg` entry must be a vote.
impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        BodyJson::<VoteMsg>::deserialize(deserializer).map(Body::from)
    }
}

/// Body whose `commit_msg` entries must all be votes.
pub fn body_from_json(text: &str) -> Result<Body> {
    parse::<BodyJson<VoteMsg>>(text).map(Body::from)
}

/// Body whose `commit_msg` entries may also be hex-encoded opaque values.
pub fn body_from_json_generic(text: &str) -> Result<Body> {
    parse::<BodyJson<Verification>>(text).map(Body::from)
}

#[derive(Serialize)]
struct BlockRef<'a> {
    header: &'a Header,
    body: &'a Body,
}

#[derive(Deserialize)]
struct BlockJson {
    header: Option<Header>,
    body: Option<Body>,
}

impl TryFrom<BlockJson> for Block {
    type Error = ModelError;

    fn try_from(j: BlockJson) -> Result<Self> {
        let header = required(j.header, "header", "Block")?;
        let body = required(j.body, "body", "Block")?;
        Ok(Block::from_parts(header, body))
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        BlockRef {
            header: self.header(),
            body: self.body(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        BlockJson::deserialize(deserializer)?
            .try_into()
            .map_err(D::Error::custom)
    }
}

pub fn block_from_json(text: &str) -> Result<Block> {
    parse::<BlockJson>(text)?.try_into()
}
