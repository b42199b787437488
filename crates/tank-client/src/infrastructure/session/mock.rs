//! In-memory transport for tests.
//!
//! [`MockTransport`] records every connection attempt (with the time it was
//! made) and every outbound frame, and lets the test play the server:
//! push inbound frames into the current connection or drop it.
//!
//! # Usage in tests
//!
//! ```ignore
//! let transport = MockTransport::new();
//! let link = SessionLink::open(transport.clone(), config, store, notices);
//!
//! view.wait_for_connectivity(ConnectivityState::Open).await;
//! transport.push_inbound(r#"{"type":"position","position":{"x":1,"y":1,"z":1}}"#);
//! transport.drop_connection();
//!
//! assert_eq!(transport.connect_attempts(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::transport::{Connection, Transport, TransportError};

#[derive(Debug, Default)]
struct MockState {
    /// Outcome of upcoming attempts; `true` accepts.  Once empty,
    /// `refuse_by_default` decides.
    script: VecDeque<bool>,
    refuse_by_default: bool,
    /// Attempts never complete; the caller's timeout decides.
    stalling: bool,
    attempts: Vec<Instant>,
    endpoints: Vec<String>,
    sent: Vec<String>,
    /// Feeds the live connection, if any.
    peer: Option<mpsc::UnboundedSender<String>>,
}

/// A scripted transport that records traffic.  Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// A transport that accepts every attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that refuses every attempt.
    pub fn refusing() -> Self {
        let t = Self::default();
        t.lock().refuse_by_default = true;
        t
    }

    /// Queues the outcome of the next attempts, in order.
    pub fn script(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.lock().script.extend(outcomes);
    }

    /// Changes the outcome for attempts beyond the script.
    pub fn set_refusing(&self, refusing: bool) {
        self.lock().refuse_by_default = refusing;
    }

    /// Makes new attempts hang, like a host that drops every packet.
    pub fn set_stalling(&self, stalling: bool) {
        self.lock().stalling = stalling;
    }

    pub fn connect_attempts(&self) -> usize {
        self.lock().attempts.len()
    }

    /// When each attempt was made.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.lock().attempts.clone()
    }

    /// Endpoints dialed, in order.
    pub fn endpoints(&self) -> Vec<String> {
        self.lock().endpoints.clone()
    }

    /// Every frame written by any connection, in order.
    pub fn sent_frames(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Delivers `frame` to the live connection.  Returns `false` if there is
    /// none.
    pub fn push_inbound(&self, frame: impl Into<String>) -> bool {
        match &self.lock().peer {
            Some(tx) => tx.send(frame.into()).is_ok(),
            None => false,
        }
    }

    /// Closes the live connection from the server side.
    pub fn drop_connection(&self) {
        self.lock().peer = None;
    }

    pub fn is_connected(&self) -> bool {
        self.lock().peer.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, TransportError> {
        let stalling = {
            let mut state = self.lock();
            state.attempts.push(Instant::now());
            state.endpoints.push(endpoint.to_string());
            state.stalling
        };
        if stalling {
            return std::future::pending().await;
        }

        let mut state = self.lock();
        let refuse = match state.script.pop_front() {
            Some(accept) => !accept,
            None => state.refuse_by_default,
        };
        if refuse {
            return Err(TransportError::Connect {
                endpoint: endpoint.to_string(),
                message: "connection refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.peer = Some(tx);
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
            inbound: rx,
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
    inbound: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.inbound.close();
    }
}
