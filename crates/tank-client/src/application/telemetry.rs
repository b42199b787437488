//! Latest-state telemetry: one writer, many readers.
//!
//! [`TelemetryStore`] owns one `watch` cell per field (position, pressure,
//! connectivity) and exposes a single mutator, [`TelemetryStore::apply`].
//! Readers get a cloneable [`TelemetryView`]; every update is a whole-value
//! overwrite of a small `Copy` record, so a reader never sees a blend of two
//! updates, only one value or the next.
//!
//! Position starts unconfirmed.  Until the device reports one (over the
//! session or in a side-channel reply), [`TelemetryView::position`] returns
//! [`Position::HOME_PLACEHOLDER`] and [`TelemetryView::reported_position`]
//! returns `None`.

use tank_core::{ConnectivityState, Position, Pressure};
use tokio::sync::watch;
use tracing::debug;

/// One whole-value overwrite of a telemetry field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryUpdate {
    /// Authoritative stage position (telemetry or side-channel reply).
    Position(Position),
    /// Completed pressure read.
    Pressure(Pressure),
    /// Session link state change.
    Connectivity(ConnectivityState),
}

/// Owner of the latest position, pressure and connectivity values.
///
/// Share it behind an `Arc` between the session task and the dispatcher;
/// nothing else should hold one.  Everything that only reads takes a
/// [`TelemetryView`].
#[derive(Debug)]
pub struct TelemetryStore {
    position: watch::Sender<Option<Position>>,
    pressure: watch::Sender<Option<Pressure>>,
    connectivity: watch::Sender<ConnectivityState>,
}

impl TelemetryStore {
    /// Creates a store with no confirmed position, no pressure reading and a
    /// `Closed` link.
    pub fn new() -> Self {
        Self {
            position: watch::Sender::new(None),
            pressure: watch::Sender::new(None),
            connectivity: watch::Sender::new(ConnectivityState::Closed),
        }
    }

    /// Overwrites one field.  The only way telemetry changes.
    pub fn apply(&self, update: TelemetryUpdate) {
        debug!(?update, "telemetry update");
        match update {
            TelemetryUpdate::Position(p) => {
                self.position.send_replace(Some(p));
            }
            TelemetryUpdate::Pressure(p) => {
                self.pressure.send_replace(Some(p));
            }
            TelemetryUpdate::Connectivity(state) => {
                self.connectivity.send_replace(state);
            }
        }
    }

    /// Returns a new read-only view.
    pub fn view(&self) -> TelemetryView {
        TelemetryView {
            position: self.position.subscribe(),
            pressure: self.pressure.subscribe(),
            connectivity: self.connectivity.subscribe(),
        }
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of every telemetry field, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Device position, or the placeholder if none has been reported.
    pub position: Position,
    /// `true` once the device has reported a position.
    pub position_confirmed: bool,
    pub pressure: Option<Pressure>,
    pub connectivity: ConnectivityState,
}

/// Read-only handle on a [`TelemetryStore`].
#[derive(Debug, Clone)]
pub struct TelemetryView {
    position: watch::Receiver<Option<Position>>,
    pressure: watch::Receiver<Option<Pressure>>,
    connectivity: watch::Receiver<ConnectivityState>,
}

impl TelemetryView {
    /// Latest device position, falling back to [`Position::HOME_PLACEHOLDER`].
    pub fn position(&self) -> Position {
        self.reported_position()
            .unwrap_or(Position::HOME_PLACEHOLDER)
    }

    /// Latest device-confirmed position, if any.
    pub fn reported_position(&self) -> Option<Position> {
        *self.position.borrow()
    }

    /// Latest pressure reading, if any.
    pub fn pressure(&self) -> Option<Pressure> {
        *self.pressure.borrow()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        *self.connectivity.borrow()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let reported = self.reported_position();
        TelemetrySnapshot {
            position: reported.unwrap_or(Position::HOME_PLACEHOLDER),
            position_confirmed: reported.is_some(),
            pressure: self.pressure(),
            connectivity: self.connectivity(),
        }
    }

    /// Waits until any field changes after the last call.
    ///
    /// Returns `false` once the store has been dropped.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            r = self.position.changed() => r.is_ok(),
            r = self.pressure.changed() => r.is_ok(),
            r = self.connectivity.changed() => r.is_ok(),
        }
    }

    /// Waits until the link reaches `target`.  Returns immediately if it is
    /// already there, and `false` if the store is dropped first.
    pub async fn wait_for_connectivity(&mut self, target: ConnectivityState) -> bool {
        self.connectivity.wait_for(|s| *s == target).await.is_ok()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
