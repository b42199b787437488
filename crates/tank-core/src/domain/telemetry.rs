//! Telemetry value types: pressure readings and link connectivity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A peak pressure reading in kilopascals.
///
/// Only ever produced by a completed instrument read; the client never
/// interpolates between readings.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pressure(f64);

impl Pressure {
    pub const fn from_kilopascals(kpa: f64) -> Self {
        Self(kpa)
    }

    pub fn kilopascals(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kPa", self.0)
    }
}

/// Connectivity of the telemetry session link.
///
/// ```text
///   Connecting ──ok──> Open ──close/error──> Closed ──timer armed──> Reconnecting
///       ^  │                                   ^                         │
///       │  └──────────── connect failed ───────┘                         │
///       └────────────────────── backoff elapsed ─────────────────────────┘
/// ```
///
/// `Closed` is also the state left behind after an explicit teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    /// A connection attempt is in flight.
    Connecting,
    /// The transport is up; commands are transmitted.
    Open,
    /// The transport is down (or the session was torn down).
    Closed,
    /// Waiting out the backoff delay before the next attempt.
    Reconnecting,
}

impl ConnectivityState {
    /// `true` only for [`ConnectivityState::Open`].
    pub fn is_open(self) -> bool {
        matches!(self, ConnectivityState::Open)
    }

    /// Lowercase label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            ConnectivityState::Connecting => "connecting",
            ConnectivityState::Open => "open",
            ConnectivityState::Closed => "closed",
            ConnectivityState::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
