//! Pub/Sub push subscription envelope

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::collections::HashMap;

use super::{DecodeError, DecodedMessage, MessageDecoder};

/// Body Pub/Sub POSTs to a push endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PubSubPushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub publish_time: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PubSubPushDecoder;

impl MessageDecoder for PubSubPushDecoder {
    fn decode(&self, envelope: &[u8]) -> Result<DecodedMessage, DecodeError> {
        let envelope: PubSubPushEnvelope = serde_json::from_slice(envelope)?;
        let message = envelope.message;

        let data = message
            .data
            .as_deref()
            .map(str::trim)
            .filter(|data| !data.is_empty())
            .ok_or(DecodeError::MissingData)?;

        Ok(DecodedMessage {
            payload: STANDARD.decode(data)?,
            message_id: message.message_id,
            attributes: message.attributes,
            publish_time: message.publish_time,
        })
    }
}
