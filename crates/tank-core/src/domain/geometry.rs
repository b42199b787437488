//! Rig geometry: device-space positions and the physical travel envelope.
//!
//! All lengths are millimeters.  Device space is the frame the stage reports
//! in: X is left/right, Y is forward/back (depth into the tank), Z is the
//! vertical axis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three stage axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in X, Y, Z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// A point in device space, in millimeters.
///
/// The client never clamps or validates a reported position: the device is
/// the source of truth for where the stage actually is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Placeholder shown before the device has confirmed a position.
    ///
    /// This is the rig's homing pose, not a measured value.
    pub const HOME_PLACEHOLDER: Position = Position::new(0.0, 0.0, 180.0);

    /// Creates a position from its three components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the component along `axis`.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Closed travel range of a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Midpoint of the range.
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Length of the range (`max - min`).
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Axis-aligned box describing the stage's physical travel envelope.
///
/// Bounds only feed the coordinate mapper.  They are never used to reject or
/// clamp positions reported by the device.
///
/// The JSON shape matches the device server's `/api/bounds` reply:
///
/// ```json
/// {"x": {"min": -35, "max": 35}, "y": {"min": -75, "max": 0}, "z": {"min": 150, "max": 195}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl Bounds {
    /// The travel envelope of the scanning rig.
    pub const RIG: Bounds = Bounds {
        x: AxisRange::new(-35.0, 35.0),
        y: AxisRange::new(-75.0, 0.0),
        z: AxisRange::new(150.0, 195.0),
    };

    /// Returns the range of `axis`.
    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Center of the box in device space.
    pub fn center(&self) -> Position {
        Position::new(self.x.center(), self.y.center(), self.z.center())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::RIG
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_center_is_midpoint_of_each_axis() {
        // Arrange / Act
        let center = Bounds::RIG.center();

        // Assert
        assert_eq!(center, Position::new(0.0, -37.5, 172.5));
    }

    #[test]
    fn test_axis_range_span() {
        assert_eq!(Bounds::RIG.x.span(), 70.0);
        assert_eq!(Bounds::RIG.y.span(), 75.0);
        assert_eq!(Bounds::RIG.z.span(), 45.0);
    }

    #[test]
    fn test_range_by_axis_matches_fields() {
        let b = Bounds::RIG;
        for axis in Axis::ALL {
            let expected = match axis {
                Axis::X => b.x,
                Axis::Y => b.y,
                Axis::Z => b.z,
            };
            assert_eq!(b.range(axis), expected);
        }
    }

    #[test]
    fn test_axis_display_is_lowercase_name() {
        let names: Vec<String> = Axis::ALL.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, ["x", "y", "z"]);
    }

    #[test]
    fn test_home_placeholder_is_at_z_180() {
        let p = Position::HOME_PLACEHOLDER;
        assert_eq!((p.x, p.y, p.z), (0.0, 0.0, 180.0));
    }

    #[test]
    fn test_bounds_deserializes_from_server_shape() {
        // Arrange
        let json = r#"{"x":{"min":-35,"max":35},"y":{"min":-75,"max":0},"z":{"min":150,"max":195}}"#;

        // Act
        let bounds: Bounds = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(bounds, Bounds::RIG);
    }

    #[test]
    fn test_position_display_uses_two_decimals() {
        let p = Position::new(1.0, -0.126, 180.0);
        assert_eq!(p.to_string(), "(1.00, -0.13, 180.00)");
    }
}
