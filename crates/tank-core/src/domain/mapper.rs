//! Device-space → normalized (visualization) space transform.
//!
//! The normalized frame is centered on the travel envelope and uses a
//! "Y is up" convention, so any renderer or logger can consume it directly:
//!
//! ```text
//! center_i = (B.i.min + B.i.max) / 2        for i in {x, y, z}
//! norm.x   =   p.x - center_x
//! norm.y   =   p.z - center_z               device up    → normalized up
//! norm.z   = -(p.y - center_y)              device depth → normalized depth, flipped
//! ```
//!
//! The inverse is exact up to floating-point rounding:
//!
//! ```text
//! p.x = norm.x + center_x
//! p.z = norm.y + center_z
//! p.y = center_y - norm.z
//! ```
//!
//! The mapper is total: it accepts any real input, including positions
//! outside the envelope, and never fails.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Bounds, Position};

/// A point in the normalized, centered, Y-up visualization frame.
///
/// Kept as a distinct type from [`Position`] so device-space and
/// visualization-space values cannot be mixed up by accident.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Stateless coordinate transform bound to a fixed travel envelope.
///
/// # Example
///
/// ```rust
/// use tank_core::{Bounds, CoordinateMapper, Position};
///
/// let mapper = CoordinateMapper::new(Bounds::RIG);
/// let n = mapper.to_normalized(Position::new(0.0, -37.5, 172.5));
/// assert_eq!((n.x, n.y, n.z), (0.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    center: Position,
}

impl CoordinateMapper {
    /// Creates a mapper for the envelope `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            center: bounds.center(),
        }
    }

    /// Device-space center used as the normalized origin.
    pub fn center(&self) -> Position {
        self.center
    }

    /// Maps a device-space position into the normalized frame.
    pub fn to_normalized(&self, p: Position) -> NormalizedPosition {
        let c = self.center;
        NormalizedPosition {
            x: p.x - c.x,
            y: p.z - c.z,
            z: -(p.y - c.y),
        }
    }

    /// Maps a normalized position back into device space.
    ///
    /// Exact inverse of [`CoordinateMapper::to_normalized`].
    pub fn to_device(&self, n: NormalizedPosition) -> Position {
        let c = self.center;
        Position {
            x: n.x + c.x,
            y: c.y - n.z,
            z: n.y + c.z,
        }
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(Bounds::RIG)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
