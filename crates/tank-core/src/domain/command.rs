//! Operator command vocabulary.
//!
//! A [`Command`] is what the operator asks for: jog the stage one step in a
//! named [`Direction`], home all axes, or sample the pressure instrument.
//! How a command travels (telemetry session vs. side channel) is decided by
//! the dispatcher, not here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building commands from untrusted input.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// Step sizes must be finite and strictly positive.
    #[error("invalid step size {0}: must be a finite positive number of millimeters")]
    InvalidStepSize(f64),

    /// The direction name is not one of the six jog directions.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}

/// One of the six jog directions, named from the operator's point of view.
///
/// Serialized in lowercase (`"forward"`, `"left"`, ...) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All six directions.
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Wire name of the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Device-space displacement `(dx, dy, dz)` for one step of `step`.
    ///
    /// Follows the device server's motion convention: left/right on X,
    /// forward is toward smaller Y, up is toward larger Z.
    pub fn delta(self, step: StepSize) -> (f64, f64, f64) {
        let s = step.millimeters();
        match self {
            Direction::Left => (-s, 0.0, 0.0),
            Direction::Right => (s, 0.0, 0.0),
            Direction::Forward => (0.0, -s, 0.0),
            Direction::Backward => (0.0, s, 0.0),
            Direction::Up => (0.0, 0.0, s),
            Direction::Down => (0.0, 0.0, -s),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CommandError::UnknownDirection(s.to_string()))
    }
}

/// A validated jog distance in millimeters.
///
/// The operator-facing presets are [`StepSize::COARSE`] (1 mm) and
/// [`StepSize::FINE`] (0.1 mm), but any finite positive value is accepted.
/// Serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct StepSize(f64);

impl StepSize {
    /// 1.0 mm.
    pub const COARSE: StepSize = StepSize(1.0);
    /// 0.1 mm.
    pub const FINE: StepSize = StepSize(0.1);

    /// Validates `millimeters` as a step size.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidStepSize`] for zero, negative, NaN or
    /// infinite values.
    pub fn new(millimeters: f64) -> Result<Self, CommandError> {
        if millimeters.is_finite() && millimeters > 0.0 {
            Ok(Self(millimeters))
        } else {
            Err(CommandError::InvalidStepSize(millimeters))
        }
    }

    /// The step length in millimeters.
    pub fn millimeters(self) -> f64 {
        self.0
    }
}

impl Default for StepSize {
    fn default() -> Self {
        Self::COARSE
    }
}

impl TryFrom<f64> for StepSize {
    type Error = CommandError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StepSize> for f64 {
    fn from(step: StepSize) -> Self {
        step.0
    }
}

/// A discrete operator intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Jog one step in a direction.
    Move { direction: Direction, step: StepSize },
    /// Home all axes.
    Home,
    /// Sample the pressure instrument.
    ReadPressure,
}

impl Command {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Move { .. } => "move",
            Command::Home => "home",
            Command::ReadPressure => "read_pressure",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
