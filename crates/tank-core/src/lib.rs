//! # tank-core
//!
//! Shared library for the scanning tank control client containing the rig
//! geometry, the device-space → visualization-space coordinate mapper, the
//! operator command vocabulary, the JSON wire protocol, and the key-binding
//! table used by the operator input router.
//!
//! This crate performs no I/O.  It has no async runtime, no sockets, and no
//! file access, so every type here can be exercised from plain `#[test]`s.
//!
//! # Architecture overview
//!
//! The scanning rig is a 3-axis motorized stage that sweeps a hydrophone
//! through a water tank while a pressure instrument samples the signal.  A
//! device server owns the serial/instrument hardware; this project is the
//! *control client* that talks to that server.
//!
//! - **`domain`** – Pure data: positions, the physical travel envelope
//!   ([`Bounds`]), the coordinate mapper, pressure readings, connectivity
//!   state and operator commands.
//!
//! - **`protocol`** – How commands and telemetry travel over the WebSocket
//!   session (`{"type": ...}` JSON envelopes) and how the request/response
//!   side channel reports success or failure.
//!
//! - **`keymap`** – The binding table from raw key names to operator actions.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tank_core::Position` instead of `tank_core::domain::geometry::Position`.
pub use domain::command::{Command, CommandError, Direction, StepSize};
pub use domain::geometry::{Axis, AxisRange, Bounds, Position};
pub use domain::mapper::{CoordinateMapper, NormalizedPosition};
pub use domain::telemetry::{ConnectivityState, Pressure};
pub use keymap::{KeyAction, KeyBinding};
pub use protocol::codec::{decode_inbound, encode_command, ProtocolError};
pub use protocol::messages::{InboundMessage, OutboundMessage};
pub use protocol::reply::{ReplyEnvelope, ReplyError};
