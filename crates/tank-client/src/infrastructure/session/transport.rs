//! Transport abstraction under the session link.
//!
//! A [`Transport`] dials the telemetry endpoint and yields a [`Connection`]
//! that moves whole text frames.  The WebSocket implementation is
//! [`WsTransport`](super::ws::WsTransport); tests use
//! [`MockTransport`](super::mock::MockTransport).

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport or an established connection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The connection attempt failed.
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    /// An error on an established connection.
    #[error("transport I/O error: {0}")]
    Io(String),
}

/// Dials the session endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, TransportError>;
}

/// An established, frame-oriented connection.
#[async_trait]
pub trait Connection: Send {
    /// Writes one text frame.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Reads the next text frame.  `None` means the peer closed the
    /// connection.
    ///
    /// Must be cancel-safe: the session drops an in-flight `recv` whenever
    /// a command or shutdown arrives first.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Closes the connection.  Errors are ignored; the connection is gone
    /// either way.
    async fn close(&mut self);
}
