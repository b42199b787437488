//! Text codec for the telemetry session.
//!
//! The transport delivers whole frames (one WebSocket text message each), so
//! the codec works on complete `&str` payloads and never has to deal with
//! partial reads.

use thiserror::Error;

use crate::domain::command::Command;
use crate::protocol::messages::{InboundMessage, OutboundMessage};

/// Errors that can occur while encoding or decoding session frames.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not valid JSON, has no `type`, or a known type is
    /// missing required fields.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The command is not carried over the telemetry session.
    #[error("command {0:?} is not sent over the telemetry session")]
    NotOnSession(&'static str),

    /// Serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OutboundMessage`] as a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_outbound(msg: &OutboundMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Encodes a [`Command`] as a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::NotOnSession`] for [`Command::Home`], which only
/// travels over the side channel.
///
/// # Examples
///
/// ```rust
/// use tank_core::{encode_command, Command, Direction, StepSize};
///
/// let frame = encode_command(&Command::Move {
///     direction: Direction::Left,
///     step: StepSize::COARSE,
/// })
/// .unwrap();
/// assert_eq!(frame, r#"{"type":"move","direction":"left","step":1.0}"#);
/// ```
pub fn encode_command(command: &Command) -> Result<String, ProtocolError> {
    let msg = OutboundMessage::from_command(command)
        .ok_or(ProtocolError::NotOnSession(command.name()))?;
    encode_outbound(&msg)
}

/// Decodes one inbound JSON text frame.
///
/// Unrecognized `type` values decode to [`InboundMessage::Unknown`] rather
/// than failing.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if the frame cannot be decoded.
pub fn decode_inbound(frame: &str) -> Result<InboundMessage, ProtocolError> {
    serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{Direction, StepSize};
    use crate::domain::geometry::Position;

    #[test]
    fn test_decode_position() {
        let msg = decode_inbound(r#"{"type":"position","position":{"x":1,"y":-2.5,"z":180}}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Position {
                position: Position::new(1.0, -2.5, 180.0)
            }
        );
    }

    #[test]
    fn test_decode_pressure() {
        let msg = decode_inbound(r#"{"type":"pressure","pressure":42.75}"#).unwrap();
        match msg {
            InboundMessage::Pressure { pressure } => assert_eq!(pressure.kilopascals(), 42.75),
            other => panic!("expected Pressure, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error() {
        let msg = decode_inbound(r#"{"type":"error","message":"stall"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Error {
                message: "stall".to_string()
            }
        );
    }

    #[test]
    fn test_decode_unknown_type_is_not_an_error() {
        assert_eq!(decode_inbound(r#"{"type":"ping"}"#).unwrap(), InboundMessage::Unknown);
        assert_eq!(
            decode_inbound(r#"{"type":"status","uptime":12,"nested":{"a":[1,2]}}"#).unwrap(),
            InboundMessage::Unknown
        );
    }

    #[test]
    fn test_decode_known_type_missing_fields_is_malformed() {
        let err = decode_inbound(r#"{"type":"position"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        for frame in ["", "not json", r#"{"no_type":true}"#, r#"{"type":"pressure","pressure":"high"}"#] {
            assert!(
                matches!(decode_inbound(frame), Err(ProtocolError::Malformed(_))),
                "frame {frame:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_encode_read_pressure() {
        assert_eq!(
            encode_command(&Command::ReadPressure).unwrap(),
            r#"{"type":"read_pressure"}"#
        );
    }

    #[test]
    fn test_encode_home_is_rejected() {
        assert_eq!(
            encode_command(&Command::Home),
            Err(ProtocolError::NotOnSession("home"))
        );
    }

    #[test]
    fn test_encode_move_accepts_arbitrary_positive_step() {
        let frame = encode_command(&Command::Move {
            direction: Direction::Up,
            step: StepSize::new(2.5).unwrap(),
        })
        .unwrap();
        assert_eq!(frame, r#"{"type":"move","direction":"up","step":2.5}"#);
    }
}
