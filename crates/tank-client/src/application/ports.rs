//! Traits the application layer sends commands through.
//!
//! [`CommandLink`] is the best-effort telemetry session; [`SideChannel`] is
//! the device server's request/response API.  The infrastructure layer
//! provides the real implementations (`SessionHandle`, `HttpSideChannel`);
//! tests substitute mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tank_core::{Bounds, Command, ConnectivityState, Direction, Position, Pressure, ReplyError, StepSize};
use thiserror::Error;

// ── Session link ──────────────────────────────────────────────────────────────

/// A best-effort, at-most-once command channel.
pub trait CommandLink: Send + Sync {
    /// Current state of the link.
    fn connectivity(&self) -> ConnectivityState;

    /// Transmits `command` if the link is open, otherwise drops it.
    ///
    /// Never blocks and never fails: a dropped command is not an error.
    fn send(&self, command: Command);
}

// ── Side channel ──────────────────────────────────────────────────────────────

/// Errors from side-channel requests.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SideChannelError {
    /// The request never got a usable HTTP response.
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// The server answered with a non-success status.
    #[error("{0}")]
    Rejected(String),

    /// The reply body did not have the expected shape.
    #[error("malformed reply: {0}")]
    Malformed(String),
}

impl From<ReplyError> for SideChannelError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Rejected { message, .. } => SideChannelError::Rejected(message),
            ReplyError::Malformed(m) => SideChannelError::Malformed(m),
        }
    }
}

/// A serial port the device server can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub device: String,
    pub description: String,
}

/// Request/response operations on the device server.
///
/// Every call yields exactly one authoritative reply.  Calls that move the
/// stage return the position the device reports afterwards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SideChannel: Send + Sync {
    /// Homes all axes.
    async fn home(&self) -> Result<Position, SideChannelError>;

    async fn list_ports(&self) -> Result<Vec<PortInfo>, SideChannelError>;

    /// Opens the motion controller on `port`.
    async fn connect_printer(&self, port: &str) -> Result<Position, SideChannelError>;

    /// Opens the pressure instrument.
    async fn connect_pressure_reader(&self) -> Result<(), SideChannelError>;

    async fn disconnect_printer(&self) -> Result<(), SideChannelError>;

    async fn disconnect_pressure_reader(&self) -> Result<(), SideChannelError>;

    /// Reads the position without moving.
    async fn position(&self) -> Result<Position, SideChannelError>;

    /// The travel envelope as the server knows it.
    async fn bounds(&self) -> Result<Bounds, SideChannelError>;

    /// Absolute move.
    async fn move_to(&self, target: Position) -> Result<Position, SideChannelError>;

    /// Relative move of one step.
    async fn move_relative(
        &self,
        direction: Direction,
        step: StepSize,
    ) -> Result<Position, SideChannelError>;

    /// Synchronous pressure read.
    async fn read_pressure(&self) -> Result<Pressure, SideChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_reply_keeps_server_message() {
        let err: SideChannelError = ReplyError::Rejected {
            status: "error".to_string(),
            message: "Printer not connected".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Printer not connected");
    }

    #[test]
    fn test_port_info_matches_server_shape() {
        let ports: Vec<PortInfo> =
            serde_json::from_str(r#"[{"device":"/dev/ttyUSB0","description":"USB Serial"}]"#)
                .unwrap();
        assert_eq!(ports[0].device, "/dev/ttyUSB0");
        assert_eq!(ports[0].description, "USB Serial");
    }
}
