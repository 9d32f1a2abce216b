//! Inbound message decoding
//!
//! A decoder unwraps whatever envelope a transport delivers and hands the raw batch JSON to
//! validation. Decoders never interpret the batch itself.

mod pubsub;


pub use pubsub::{PubSubMessage, PubSubPushDecoder, PubSubPushEnvelope};

use std::collections::HashMap;
use thiserror::Error;

/// Envelope could not be unwrapped
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("message has no data")]
    MissingData,

    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Raw batch payload plus the transport's own bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    pub payload: Vec<u8>,
    pub message_id: Option<String>,
    pub attributes: HashMap<String, String>,
    pub publish_time: Option<String>,
}

impl DecodedMessage {
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }
}

/// Converts a transport envelope into raw batch bytes
pub trait MessageDecoder: Send + Sync {
    fn decode(&self, envelope: &[u8]) -> Result<DecodedMessage, DecodeError>;
}

/// Bytes are already the batch JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDecoder;

impl MessageDecoder for PassthroughDecoder {
    fn decode(&self, envelope: &[u8]) -> Result<DecodedMessage, DecodeError> {
        Ok(DecodedMessage::from_payload(envelope))
    }
}
