//! Telemetry session link: connection state machine and inbound dispatch.
//!
//! [`SessionLink::open`] spawns one task that owns the transport, the
//! connectivity state and every write to the [`TelemetryStore`] coming from
//! the session.  Commands reach it over a channel; inbound frames are
//! decoded and routed by message type.
//!
//! # State machine
//!
//! ```text
//!            ┌──────────── connect failed ─────────────┐
//!            │                                         v
//!   ──> Connecting ──ok──> Open ──close / error──> Closed ──> Reconnecting
//!            ^                                                    │
//!            └─────────────── reconnect_delay elapsed ────────────┘
//! ```
//!
//! The delay is constant and retries never stop; only
//! [`SessionLink::shutdown`] (or dropping the link) ends the loop.  Shutdown
//! is observed while connecting, while open and during the backoff sleep, so
//! no attempt is made after it.
//!
//! # Delivery
//!
//! Commands are sent at most once and only while `Open`.  A command issued
//! in any other state is dropped on the spot, and commands still queued
//! when a connection is lost are discarded before the next connection
//! opens.

pub mod mock;
pub mod transport;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use tank_core::{decode_inbound, encode_command, Command, ConnectivityState, InboundMessage};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::notices::NoticeBoard;
use crate::application::ports::CommandLink;
use crate::application::telemetry::{TelemetryStore, TelemetryUpdate, TelemetryView};

pub use mock::MockTransport;
pub use transport::{Connection, Transport, TransportError};
pub use ws::WsTransport;

/// Default pause between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Default limit on a single connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where to connect and how long to wait between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Full session URL, e.g. `ws://localhost:8000/ws`.
    pub endpoint: String,
    pub reconnect_delay: Duration,
    /// An attempt still pending after this long counts as refused.
    pub connect_timeout: Duration,
}

impl SessionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

// ── Public handles ────────────────────────────────────────────────────────────

/// Owner of a running session.
///
/// Dropping the link aborts the session task and marks the link `Closed`;
/// [`SessionLink::shutdown`] closes the transport cleanly and waits for the
/// task to finish.
#[derive(Debug)]
pub struct SessionLink {
    handle: SessionHandle,
    events: broadcast::Sender<ConnectivityState>,
    store: Arc<TelemetryStore>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionLink {
    /// Starts the session task and makes the first connection attempt.
    ///
    /// Must be called from within a Tokio runtime.  Call once per session;
    /// the returned link owns the whole lifecycle.
    pub fn open<T>(
        transport: T,
        config: SessionConfig,
        store: Arc<TelemetryStore>,
        notices: Arc<NoticeBoard>,
    ) -> Self
    where
        T: Transport + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (events, _) = broadcast::channel(16);

        let handle = SessionHandle {
            commands: cmd_tx,
            view: store.view(),
        };

        let actor = SessionActor {
            transport,
            config,
            store: Arc::clone(&store),
            notices,
            events: events.clone(),
            commands: cmd_rx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(actor.run());

        Self {
            handle,
            events,
            store,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// A cloneable sending handle for the dispatcher.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Best-effort send; see [`SessionHandle::send`].
    pub fn send(&self, command: Command) {
        self.handle.send(command);
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.handle.connectivity()
    }

    /// Receives every connectivity transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityState> {
        self.events.subscribe()
    }

    /// Tears the session down: cancels any pending reconnect, closes the
    /// transport, and waits for the session task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("session task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for SessionLink {
    fn drop(&mut self) {
        // `shutdown` already took the task and published `Closed`.
        if let Some(task) = self.task.take() {
            task.abort();
            self.store
                .apply(TelemetryUpdate::Connectivity(ConnectivityState::Closed));
            let _ = self.events.send(ConnectivityState::Closed);
            info!("session dropped without shutdown; link closed");
        }
    }
}

/// Cheap cloneable sender for a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: TelemetryView,
}

impl CommandLink for SessionHandle {
    fn connectivity(&self) -> ConnectivityState {
        self.view.connectivity()
    }

    /// Queues `command` for the session task if the link is open, otherwise
    /// drops it.
    fn send(&self, command: Command) {
        let state = self.view.connectivity();
        if !state.is_open() {
            debug!(command = command.name(), %state, "session not open; dropping command");
            return;
        }
        if self.commands.send(command).is_err() {
            debug!(command = command.name(), "session task gone; dropping command");
        }
    }
}

// ── Session task ──────────────────────────────────────────────────────────────

struct SessionActor<T> {
    transport: T,
    config: SessionConfig,
    store: Arc<TelemetryStore>,
    notices: Arc<NoticeBoard>,
    events: broadcast::Sender<ConnectivityState>,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: oneshot::Receiver<()>,
}

/// Why a session phase ended.
enum Exit {
    /// Connection lost or refused; back off and retry.
    Retry,
    /// Teardown requested; stop for good.
    Stop,
}

/// What woke the open-session loop.
enum Wake {
    Shutdown,
    Command(Option<Command>),
    Frame(Option<Result<String, TransportError>>),
}

impl<T: Transport> SessionActor<T> {
    async fn run(mut self) {
        info!(endpoint = %self.config.endpoint, "session starting");
        loop {
            if let Exit::Stop = self.connect_and_serve().await {
                break;
            }
            if let Exit::Stop = self.back_off().await {
                break;
            }
        }
        self.transition(ConnectivityState::Closed);
        info!("session stopped");
    }

    /// One connection lifetime: `Connecting`, then `Open` until it drops.
    async fn connect_and_serve(&mut self) -> Exit {
        self.transition(ConnectivityState::Connecting);

        let attempt = tokio::select! {
            biased;
            _ = &mut self.shutdown => return Exit::Stop,
            r = tokio::time::timeout(
                self.config.connect_timeout,
                self.transport.connect(&self.config.endpoint),
            ) => r,
        };
        let mut conn = match attempt {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                warn!("{e}");
                self.transition(ConnectivityState::Closed);
                return Exit::Retry;
            }
            Err(_) => {
                warn!(
                    endpoint = %self.config.endpoint,
                    timeout = ?self.config.connect_timeout,
                    "connection attempt timed out"
                );
                self.transition(ConnectivityState::Closed);
                return Exit::Retry;
            }
        };

        // Anything queued before this connection is stale.
        let mut stale = 0usize;
        while self.commands.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "discarded commands from previous connection");
        }

        self.transition(ConnectivityState::Open);

        let exit = loop {
            let wake = tokio::select! {
                biased;
                _ = &mut self.shutdown => Wake::Shutdown,
                frame = conn.recv() => Wake::Frame(frame),
                cmd = self.commands.recv() => Wake::Command(cmd),
            };

            match wake {
                Wake::Shutdown | Wake::Command(None) => {
                    conn.close().await;
                    break Exit::Stop;
                }
                Wake::Command(Some(cmd)) => {
                    if let Err(e) = transmit(conn.as_mut(), cmd).await {
                        warn!("send failed, dropping connection: {e}");
                        break Exit::Retry;
                    }
                }
                Wake::Frame(Some(Ok(text))) => self.route(&text),
                Wake::Frame(Some(Err(e))) => {
                    warn!("session transport error: {e}");
                    break Exit::Retry;
                }
                Wake::Frame(None) => {
                    info!("session closed by server");
                    break Exit::Retry;
                }
            }
        };

        if let Exit::Retry = exit {
            self.transition(ConnectivityState::Closed);
        }
        exit
    }

    /// Waits out the reconnect delay unless shutdown arrives first.
    async fn back_off(&mut self) -> Exit {
        self.transition(ConnectivityState::Reconnecting);
        debug!(delay = ?self.config.reconnect_delay, "reconnect scheduled");
        tokio::select! {
            biased;
            _ = &mut self.shutdown => Exit::Stop,
            _ = tokio::time::sleep(self.config.reconnect_delay) => Exit::Retry,
        }
    }

    /// Applies one inbound frame.  Bad frames are logged and dropped.
    fn route(&self, text: &str) {
        let msg = match decode_inbound(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("dropping frame: {e}");
                return;
            }
        };
        debug!(kind = msg.type_name(), "<- session");

        match msg {
            InboundMessage::Position { position } => {
                self.store.apply(TelemetryUpdate::Position(position));
            }
            InboundMessage::Pressure { pressure } => {
                self.store.apply(TelemetryUpdate::Pressure(pressure));
            }
            InboundMessage::Error { message } => self.notices.raise(message),
            InboundMessage::Unknown => {}
        }
    }

    fn transition(&self, state: ConnectivityState) {
        info!(%state, "session state");
        self.store.apply(TelemetryUpdate::Connectivity(state));
        let _ = self.events.send(state);
    }
}

/// Encodes and writes one command.  A command with no session encoding is
/// logged and skipped; only a transport failure is an error.
async fn transmit(conn: &mut dyn Connection, command: Command) -> Result<(), TransportError> {
    let frame = match encode_command(&command) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("not sending {}: {e}", command.name());
            return Ok(());
        }
    };
    debug!(%frame, "-> session");
    conn.send(frame).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
