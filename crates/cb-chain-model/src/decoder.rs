//! Byte-level decoding of chain values.
//!
//! How a body's verifications are read depends on the consensus engine, so
//! [`BlockDecoder`] delegates bodies to a swappable [`BodyDecoder`].

use rlp::{DecoderError, Rlp};
use tracing::{debug, warn};

use crate::domain::{Block, Body, Header, Transaction};
use crate::error::Result;
use crate::json;

/// Strategy for reading block bodies.
pub trait BodyDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode_body(&self, rlp: &Rlp) -> std::result::Result<Body, DecoderError>;

    fn decode_body_json(&self, text: &str) -> Result<Body>;
}

/// Every verification must be a well-formed vote.
#[derive(Debug, Clone, Copy, Default)]
pub struct PbftBodyDecoder;

impl BodyDecoder for PbftBodyDecoder {
    fn name(&self) -> &'static str {
        "pbft"
    }

    fn decode_body(&self, rlp: &Rlp) -> std::result::Result<Body, DecoderError> {
        rlp.as_val()
    }

    fn decode_body_json(&self, text: &str) -> Result<Body> {
        json::body_from_json(text)
    }
}

/// Verifications that are not votes are kept as opaque values.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericBodyDecoder;

impl BodyDecoder for GenericBodyDecoder {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn decode_body(&self, rlp: &Rlp) -> std::result::Result<Body, DecoderError> {
        Body::decode_generic(rlp)
    }

    fn decode_body_json(&self, text: &str) -> Result<Body> {
        json::body_from_json_generic(text)
    }
}

pub struct BlockDecoder {
    body: Box<dyn BodyDecoder>,
}

impl Default for BlockDecoder {
    fn default() -> Self {
        Self::new(Box::new(PbftBodyDecoder))
    }
}

impl BlockDecoder {
    pub fn new(body: Box<dyn BodyDecoder>) -> Self {
        Self { body }
    }

    pub fn set_body_decoder(&mut self, body: Box<dyn BodyDecoder>) {
        debug!(from = self.body.name(), to = body.name(), "body decoder replaced");
        self.body = body;
    }

    pub fn body_decoder(&self) -> &dyn BodyDecoder {
        self.body.as_ref()
    }

    pub fn decode_header(&self, bytes: &[u8]) -> Result<Header> {
        rlp::decode(bytes).map_err(|e| self.failed("header", e))
    }

    pub fn decode_body(&self, bytes: &[u8]) -> Result<Body> {
        self.body
            .decode_body(&Rlp::new(bytes))
            .map_err(|e| self.failed("body", e))
    }

    pub fn decode_block(&self, bytes: &[u8]) -> Result<Block> {
        Block::decode_with(&Rlp::new(bytes), |rlp| self.body.decode_body(rlp))
            .map_err(|e| self.failed("block", e))
    }

    /// Block from separately stored header and body encodings.
    pub fn decode_block_from(&self, header: &[u8], body: &[u8]) -> Result<Block> {
        Ok(Block::from_parts(self.decode_header(header)?, self.decode_body(body)?))
    }

    pub fn decode_transaction(&self, bytes: &[u8]) -> Result<Transaction> {
        rlp::decode(bytes).map_err(|e| self.failed("transaction", e))
    }

    pub fn decode_body_json(&self, text: &str) -> Result<Body> {
        self.body.decode_body_json(text).map_err(|e| {
            warn!(decoder = self.body.name(), error = %e, "body json decode failed");
            e
        })
    }

    fn failed(&self, what: &'static str, e: DecoderError) -> crate::error::ModelError {
        warn!(decoder = self.body.name(), what, error = %e, "decode failed");
        e.into()
    }
}
