//! Key-binding table for operator input.
//!
//! Key names follow the DOM `KeyboardEvent.key` vocabulary (`"ArrowUp"`,
//! `"PageDown"`, `"Shift"`, single characters for letters), matched
//! case-insensitively so `"W"` with caps lock behaves like `"w"`.

use crate::domain::command::Direction;

/// What a bound key does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Jog one step in a direction.
    Jog(Direction),
    Home,
    ReadPressure,
    /// While held, jogs use the fine step instead of the coarse one.
    FineModifier,
}

/// One entry in the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: &'static str,
    pub action: KeyAction,
    /// Short help text for the operator console.
    pub help: &'static str,
}

/// The default bindings: WASD plus arrows for the horizontal plane, Q/E and
/// PageUp/PageDown for the vertical axis.
#[rustfmt::skip]
pub const DEFAULT_BINDINGS: &[KeyBinding] = &[
    KeyBinding { key: "ArrowUp", action: KeyAction::Jog(Direction::Forward), help: "jog forward" },
    KeyBinding { key: "w", action: KeyAction::Jog(Direction::Forward), help: "jog forward" },
    KeyBinding { key: "ArrowDown", action: KeyAction::Jog(Direction::Backward), help: "jog backward" },
    KeyBinding { key: "s", action: KeyAction::Jog(Direction::Backward), help: "jog backward" },
    KeyBinding { key: "ArrowLeft", action: KeyAction::Jog(Direction::Left), help: "jog left" },
    KeyBinding { key: "a", action: KeyAction::Jog(Direction::Left), help: "jog left" },
    KeyBinding { key: "ArrowRight", action: KeyAction::Jog(Direction::Right), help: "jog right" },
    KeyBinding { key: "d", action: KeyAction::Jog(Direction::Right), help: "jog right" },
    KeyBinding { key: "PageUp", action: KeyAction::Jog(Direction::Up), help: "jog up" },
    KeyBinding { key: "q", action: KeyAction::Jog(Direction::Up), help: "jog up" },
    KeyBinding { key: "PageDown", action: KeyAction::Jog(Direction::Down), help: "jog down" },
    KeyBinding { key: "e", action: KeyAction::Jog(Direction::Down), help: "jog down" },
    KeyBinding { key: "p", action: KeyAction::ReadPressure, help: "read pressure" },
    KeyBinding { key: "Space", action: KeyAction::ReadPressure, help: "read pressure" },
    KeyBinding { key: "h", action: KeyAction::Home, help: "home all axes" },
    KeyBinding { key: "Shift", action: KeyAction::FineModifier, help: "hold for 0.1 mm steps" },
];

/// Looks up the action bound to `key` in [`DEFAULT_BINDINGS`].
///
/// `" "` is accepted as a synonym for `"Space"`, and the sided DOM codes
/// `"ShiftLeft"` / `"ShiftRight"` for `"Shift"`.
pub fn lookup(key: &str) -> Option<KeyAction> {
    let key = match key {
        " " => "Space",
        "ShiftLeft" | "ShiftRight" => "Shift",
        other => other,
    };
    DEFAULT_BINDINGS
        .iter()
        .find(|b| b.key.eq_ignore_ascii_case(key))
        .map(|b| b.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_direction_has_two_bindings() {
        for dir in Direction::ALL {
            let count = DEFAULT_BINDINGS
                .iter()
                .filter(|b| b.action == KeyAction::Jog(dir))
                .count();
            assert_eq!(count, 2, "{dir} should have a letter and a navigation key");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("W"), Some(KeyAction::Jog(Direction::Forward)));
        assert_eq!(lookup("arrowleft"), Some(KeyAction::Jog(Direction::Left)));
    }

    #[test]
    fn test_lookup_synonyms() {
        assert_eq!(lookup(" "), Some(KeyAction::ReadPressure));
        assert_eq!(lookup("ShiftRight"), Some(KeyAction::FineModifier));
        assert_eq!(lookup("h"), Some(KeyAction::Home));
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(lookup("z"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in DEFAULT_BINDINGS.iter().enumerate() {
            for b in &DEFAULT_BINDINGS[i + 1..] {
                assert!(!a.key.eq_ignore_ascii_case(b.key), "duplicate binding {}", a.key);
            }
        }
    }
}
