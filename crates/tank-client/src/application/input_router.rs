//! InputRouter: raw key events to operator commands.
//!
//! Edge-triggered: every key-down of a bound key yields exactly one command,
//! including OS auto-repeat key-downs.  Holding a key does not stream
//! commands on its own, and repeats are not suppressed.  Key-ups only matter
//! for the fine-step modifier.

use tank_core::keymap::{self, KeyAction};
use tank_core::{Command, StepSize};
use tracing::trace;

/// A raw keyboard event, keyed by DOM-style key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down(String),
    Up(String),
}

/// Turns key events into [`Command`]s.
#[derive(Debug, Clone)]
pub struct InputRouter {
    coarse: StepSize,
    fine: StepSize,
    fine_held: bool,
}

impl InputRouter {
    /// Router with the 1.0 mm / 0.1 mm step presets.
    pub fn new() -> Self {
        Self::with_steps(StepSize::COARSE, StepSize::FINE)
    }

    pub fn with_steps(coarse: StepSize, fine: StepSize) -> Self {
        Self {
            coarse,
            fine,
            fine_held: false,
        }
    }

    /// Step applied to the next jog.
    pub fn current_step(&self) -> StepSize {
        if self.fine_held {
            self.fine
        } else {
            self.coarse
        }
    }

    pub fn handle(&mut self, event: &KeyEvent) -> Option<Command> {
        match event {
            KeyEvent::Down(key) => self.key_down(key),
            KeyEvent::Up(key) => {
                self.key_up(key);
                None
            }
        }
    }

    /// Handles a key press.  Unbound keys yield `None`.
    pub fn key_down(&mut self, key: &str) -> Option<Command> {
        let action = keymap::lookup(key);
        trace!(key, ?action, "key down");
        match action? {
            KeyAction::Jog(direction) => Some(Command::Move {
                direction,
                step: self.current_step(),
            }),
            KeyAction::Home => Some(Command::Home),
            KeyAction::ReadPressure => Some(Command::ReadPressure),
            KeyAction::FineModifier => {
                self.fine_held = true;
                None
            }
        }
    }

    /// Handles a key release.
    pub fn key_up(&mut self, key: &str) {
        if keymap::lookup(key) == Some(KeyAction::FineModifier) {
            self.fine_held = false;
        }
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}
