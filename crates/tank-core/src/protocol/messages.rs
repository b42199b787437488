//! JSON message types for the telemetry session.
//!
//! Every frame on the session is a single JSON object whose `"type"` field
//! selects the variant; the remaining fields sit next to it in the same
//! object.  Serde's `#[serde(tag = "type")]` handles the discriminant.
//!
//! # Message flow
//!
//! ```text
//! Client → Device server:  {"type":"move","direction":"up","step":1.0}
//!                          {"type":"read_pressure"}
//! Device server → Client:  {"type":"position","position":{"x":0,"y":0,"z":180}}
//!                          {"type":"pressure","pressure":12.3}
//!                          {"type":"error","message":"stall"}
//! ```
//!
//! Two separate enums keep the directions apart: sending an inbound-only
//! variant to the server is a compile-time error.
//!
//! # Forward compatibility
//!
//! [`InboundMessage::Unknown`] absorbs any `type` the client does not know,
//! so a newer server can add message kinds without breaking older clients.
//! A frame that names a *known* type but is missing its fields is still a
//! decode error.

use serde::{Deserialize, Serialize};

use crate::domain::command::{Command, Direction, StepSize};
use crate::domain::geometry::Position;
use crate::domain::telemetry::Pressure;

// ── Client → Device server ────────────────────────────────────────────────────

/// Messages the client sends over the telemetry session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Jog the stage by `step` millimeters in `direction`.
    Move { direction: Direction, step: StepSize },
    /// Ask for a pressure sample; the reply arrives later as
    /// [`InboundMessage::Pressure`] with no request correlation.
    ReadPressure,
}

impl OutboundMessage {
    /// Wire envelope for `command`, or `None` if the command does not travel
    /// over the session (homing uses the side channel).
    pub fn from_command(command: &Command) -> Option<Self> {
        match *command {
            Command::Move { direction, step } => Some(OutboundMessage::Move { direction, step }),
            Command::ReadPressure => Some(OutboundMessage::ReadPressure),
            Command::Home => None,
        }
    }

    /// The `type` tag, for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundMessage::Move { .. } => "move",
            OutboundMessage::ReadPressure => "read_pressure",
        }
    }
}

// ── Device server → Client ────────────────────────────────────────────────────

/// Messages the device server pushes over the telemetry session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Authoritative stage position after a move.
    Position { position: Position },
    /// Result of a pressure read.
    Pressure { pressure: Pressure },
    /// The server could not carry out a request.
    Error { message: String },
    /// Any `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// The `type` tag, for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            InboundMessage::Position { .. } => "position",
            InboundMessage::Pressure { .. } => "pressure",
            InboundMessage::Error { .. } => "error",
            InboundMessage::Unknown => "unknown",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_serializes_with_flat_fields() {
        // Arrange
        let msg = OutboundMessage::Move {
            direction: Direction::Forward,
            step: StepSize::FINE,
        };

        // Act
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        // Assert
        assert_eq!(
            json,
            serde_json::json!({"type": "move", "direction": "forward", "step": 0.1})
        );
    }

    #[test]
    fn test_read_pressure_serializes_as_bare_tag() {
        let json = serde_json::to_string(&OutboundMessage::ReadPressure).unwrap();
        assert_eq!(json, r#"{"type":"read_pressure"}"#);
    }

    #[test]
    fn test_home_has_no_session_envelope() {
        assert_eq!(OutboundMessage::from_command(&Command::Home), None);
    }

    #[test]
    fn test_from_command_maps_move_and_read() {
        let mv = Command::Move {
            direction: Direction::Down,
            step: StepSize::COARSE,
        };
        assert_eq!(
            OutboundMessage::from_command(&mv),
            Some(OutboundMessage::Move {
                direction: Direction::Down,
                step: StepSize::COARSE
            })
        );
        assert_eq!(
            OutboundMessage::from_command(&Command::ReadPressure),
            Some(OutboundMessage::ReadPressure)
        );
    }

    #[test]
    fn test_inbound_type_names() {
        let pos = InboundMessage::Position {
            position: Position::HOME_PLACEHOLDER,
        };
        assert_eq!(pos.type_name(), "position");
        assert_eq!(InboundMessage::Unknown.type_name(), "unknown");
    }
}
