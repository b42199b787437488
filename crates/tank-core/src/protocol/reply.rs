//! Reply envelope for the device server's request/response side channel.
//!
//! Every side-channel reply is a JSON object with a `status` field.  A
//! failed request carries `{"status":"error","message":"..."}`; a successful
//! one carries `"ok"` (or `"connected"` / `"disconnected"` for the
//! connect/disconnect calls) plus operation-specific fields next to it:
//!
//! ```text
//! {"status":"ok","position":{"x":0,"y":0,"z":180}}
//! {"status":"connected","port":"/dev/ttyUSB0","position":{...}}
//! {"status":"error","message":"Printer not connected"}
//! ```
//!
//! [`ReplyEnvelope`] splits the status off and keeps the rest as a JSON map so
//! each call can pick its own payload type with [`ReplyEnvelope::into_payload`].
//! Only `"ok"` is accepted by default; the connect and disconnect calls pass
//! their wider status set to [`ReplyEnvelope::into_payload_with`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Success statuses for ordinary requests (home, moves, pressure).
pub const OK_STATUSES: &[&str] = &["ok"];

/// Success statuses for the connect calls.
pub const CONNECT_STATUSES: &[&str] = &["ok", "connected"];

/// Success statuses for the disconnect calls.
pub const DISCONNECT_STATUSES: &[&str] = &["ok", "disconnected"];

/// Errors produced while interpreting a side-channel reply.
#[derive(Debug, Error, PartialEq)]
pub enum ReplyError {
    /// The server answered but refused the request.
    #[error("server rejected request: {message}")]
    Rejected { status: String, message: String },

    /// The reply did not have the expected shape.
    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// A decoded side-channel reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplyEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ReplyEnvelope {
    /// Parses a reply body.
    pub fn parse(body: &str) -> Result<Self, ReplyError> {
        serde_json::from_str(body).map_err(|e| ReplyError::Malformed(e.to_string()))
    }

    /// Whether the status is one of `accepted`.
    pub fn is_success(&self, accepted: &[&str]) -> bool {
        accepted.contains(&self.status.as_str())
    }

    /// [`ReplyEnvelope::into_payload_with`] accepting only `"ok"`.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, ReplyError> {
        self.into_payload_with(OK_STATUSES)
    }

    /// Checks the status against `accepted` and decodes the remaining fields
    /// as `T`.
    ///
    /// Use [`serde::de::IgnoredAny`] for calls whose only payload is the
    /// status itself.
    ///
    /// # Errors
    ///
    /// [`ReplyError::Rejected`] for any other status, carrying the server's
    /// message; [`ReplyError::Malformed`] if the fields do not fit `T`.
    pub fn into_payload_with<T: DeserializeOwned>(
        self,
        accepted: &[&str],
    ) -> Result<T, ReplyError> {
        if !self.is_success(accepted) {
            let message = self
                .message
                .unwrap_or_else(|| format!("request failed with status {:?}", self.status));
            return Err(ReplyError::Rejected {
                status: self.status,
                message,
            });
        }
        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| ReplyError::Malformed(e.to_string()))
    }
}
