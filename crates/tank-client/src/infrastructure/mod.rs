//! Infrastructure layer for the control client.
//!
//! **Dependency rule**: this layer may depend on `application` and `tank_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`session`** – The telemetry session link: reconnect state machine,
//!   inbound routing, and the `Transport` / `Connection` seam with its
//!   WebSocket and in-memory implementations.
//!
//! - **`side_channel`** – `HttpSideChannel`, the reqwest client for the
//!   device server's REST endpoints.
//!
//! - **`config`** – TOML configuration file and the endpoints derived from it.

pub mod config;
pub mod session;
pub mod side_channel;

pub use session::{SessionConfig, SessionHandle, SessionLink};
pub use side_channel::HttpSideChannel;
