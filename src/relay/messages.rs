//! Relay Wire Frames
//!
//! JSON text frames with a `type` discriminator. Control frames are fully
//! typed; everything else is an opaque routable payload carrying optional
//! `sender_id` / `receiver_id` fields that the relay reads but never
//! rewrites.

use serde::{Deserialize, Serialize};

/// Frames the server originates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Connection acknowledgement, sent immediately on accept
    Connection { message: String },
    /// Heartbeat probe
    Ping,
}

impl ServerFrame {
    /// Acknowledgement text sent on every new connection.
    pub const ACK_MESSAGE: &'static str = "Connected to server";

    pub fn connection_ack() -> Self {
        Self::Connection {
            message: Self::ACK_MESSAGE.to_string(),
        }
    }

    /// Serialize to a text frame.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Frames received from clients.
///
/// `pong` is the only recognized control frame; everything else that parses
/// as JSON is treated as a routable payload. Routing fields are extracted
/// without consuming the raw value so forwarding stays verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    /// Heartbeat acknowledgement
    Pong,
    /// Routable application payload, forwarded without interpretation
    Routed {
        sender_id: Option<String>,
        receiver_id: Option<String>,
        raw: serde_json::Value,
    },
}

impl ClientFrame {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for non-JSON input; the
    /// connection handler logs it and keeps the connection open.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: serde_json::Value = serde_json::from_str(text)?;

        if raw.get("type").and_then(|v| v.as_str()) == Some("pong") {
            return Ok(Self::Pong);
        }

        let sender_id = raw
            .get("sender_id")
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let receiver_id = raw
            .get("receiver_id")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        Ok(Self::Routed {
            sender_id,
            receiver_id,
            raw,
        })
    }
}
