/*
[INPUT]:  Channel names (outbound) and raw text frames (inbound)
[OUTPUT]: bts:subscribe / bts:unsubscribe control frames, generic inbound envelopes
[POS]:    WebSocket layer - message encoding and optional decoding
[UPDATE]: When adding new control events or changing frame format
*/

use serde::{Deserialize, Serialize};

use crate::http::Result;

pub const SUBSCRIBE_EVENT: &str = "bts:subscribe";
pub const UNSUBSCRIBE_EVENT: &str = "bts:unsubscribe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelData {
    pub channel: String,
}

/// Outbound control frame: `{"event": ..., "data": {"channel": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub event: String,
    pub data: ChannelData,
}

impl ControlMessage {
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self {
            event: SUBSCRIBE_EVENT.to_string(),
            data: ChannelData {
                channel: channel.into(),
            },
        }
    }

    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        Self {
            event: UNSUBSCRIBE_EVENT.to_string(),
            data: ChannelData {
                channel: channel.into(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Generic view of an inbound frame for callers that want structure.
///
/// Trade, order book and `bts:subscription_succeeded` frames all share this envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl InboundMessage {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn is_subscription_ack(&self) -> bool {
        self.event == "bts:subscription_succeeded"
    }

    /// The exchange asks clients to reconnect before maintenance
    pub fn is_reconnect_request(&self) -> bool {
        self.event == "bts:request_reconnect"
    }
}
