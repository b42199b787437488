//! tank-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tank-client do?
//!
//! The device server sits next to the scanning rig and owns the motion
//! controller and the pressure instrument.  This client is what the operator
//! drives it with:
//!
//! 1. Keeps a WebSocket telemetry session open to the server, reconnecting
//!    forever at a constant delay whenever it drops.
//! 2. Sends jog and pressure-read commands over that session, best effort:
//!    a command issued while the session is down is dropped, never queued.
//! 3. Applies pushed `position` / `pressure` telemetry to a single-writer
//!    store that any number of views read.
//! 4. Uses the server's REST side channel for operations that need one
//!    authoritative reply (homing, device connect/disconnect, absolute moves).
//! 5. Turns operator key presses into commands, one per key-down.

/// Application layer: telemetry store, notices, command dispatch, input routing.
pub mod application;

/// Infrastructure layer: session transport, HTTP side channel, configuration.
pub mod infrastructure;
