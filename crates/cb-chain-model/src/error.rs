//! Error types for the chain model

use shared_crypto::CryptoError;
use shared_types::{Address, AddressType, Hash, U256};
use thiserror::Error;

/// Result type alias for chain model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building, decoding, signing or validating chain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Signature recovery or key handling failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Canonical binary decoding failed
    #[error("rlp: {0}")]
    Rlp(#[from] rlp::DecoderError),

    /// Text decoding failed
    #[error("json: {0}")]
    Json(String),

    /// Transaction JSON carried a signature outside the accepted range
    #[error("UnmarshalJSON invalid transaction v, r, s values")]
    JsonInvalidSignature,

    /// Intrinsic gas overflowed a `u64`
    #[error("out of gas")]
    OutOfGas,

    /// Receipt was read before it was padded
    #[error("not set tx receipt")]
    ReceiptNotSet,

    /// Block receipts were read before they were padded
    #[error("block receipts are empty")]
    BlockReceiptsEmpty,

    /// Block fees were summed before a contract transaction's fee was settled
    #[error("contract tx {0} has no settled fee")]
    ContractFeeNotSettled(Hash),

    /// Transaction index was read before it was padded
    #[error("not set tx index")]
    TxIndexNotSet,

    /// Negative input to the reputation curve
    #[error("invalid number")]
    InvalidNumber,

    /// Stake below the election threshold
    #[error("stake not sufficient")]
    StakeNotSufficient,

    /// Only boot-node and alive-verifier votes are accepted while halted
    #[error("wrong vote type")]
    WrongVoteType,

    /// Address recovered from a vote signature differs from its witness
    #[error("the vote recover address is invalid")]
    VoteRecoverAddrError,

    /// Vote has no witness to check
    #[error("vote witness missing")]
    MissingWitness,

    /// Boot-node vote from an address outside the boot set
    #[error("the address isn't verifier boot node")]
    AddressIsNotVerifierBootNode,

    /// Alive-verifier vote from an address outside the current verifiers
    #[error("the recover address isn't current verifier")]
    AddressIsNotCurrentVerifier,

    /// Recipient tag not routed by any transaction handler
    #[error("unknown recipient type {0}")]
    UnknownRecipientType(AddressType),

    /// Gas limit cannot cover the intrinsic cost
    #[error("intrinsic gas too low: have {have}, want {want}")]
    IntrinsicGasTooLow {
        /// Gas limit of the transaction
        have: u64,
        /// Intrinsic gas of the payload
        want: u64,
    },

    /// Account nonce already past the transaction nonce
    #[error("nonce too low for {address}: state {state}, tx {tx}")]
    NonceTooLow {
        /// Sender
        address: Address,
        /// Next nonce in state
        state: u64,
        /// Nonce carried by the transaction
        tx: u64,
    },

    /// Sender cannot pay `gas_price * gas_limit + amount`
    #[error("insufficient balance for {address}: have {balance}, cost {cost}")]
    InsufficientBalance {
        /// Sender
        address: Address,
        /// Account balance
        balance: U256,
        /// Transaction cost
        cost: U256,
    },

    /// `run_work_map` called without transactions
    #[error("no transactions to process")]
    EmptyWorkMap,

    /// Transaction-ID cacher is not running
    #[error("tx cacher stopped")]
    CacherStopped,

    /// The cacher pool could not be built
    #[error("tx cacher spawn: {0}")]
    CacherSpawn(String),

    /// Bloom configuration or merge failure
    #[error("bloom: {0}")]
    Bloom(#[from] cb_bloom_filters::FilterError),

    /// Configuration value could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Operation intentionally not provided
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
}
