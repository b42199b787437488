//! Line-based operator console.
//!
//! Each input line is either a key token, turned into the key-down/key-up
//! events a keyboard would produce, or a side-channel verb:
//!
//! ```text
//! w a s d q e            jog forward / left / backward / right / up / down
//! up down left right     same as the arrow keys
//! pgup pgdn              jog up / down
//! shift+<key>            jog with the fine (0.1 mm) step
//! p | space              read pressure
//! h                      home all axes
//! ports                  list serial ports on the server
//! connect printer <port> open the motion controller
//! connect ad3            open the pressure instrument
//! disconnect printer|ad3
//! goto <x> <y> <z>       absolute move (device mm)
//! position               re-read the position from the server
//! bounds                 travel envelope reported by the server
//! status                 print the current telemetry
//! help
//! quit
//! ```

use std::fmt::Write as _;

use tank_client::application::input_router::KeyEvent;
use tank_core::keymap;
use tank_core::{Axis, Bounds, Position};
use thiserror::Error;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// Key events to feed the input router, in order.
    Keys(Vec<KeyEvent>),
    Ports,
    ConnectPrinter(String),
    ConnectPressureReader,
    DisconnectPrinter,
    DisconnectPressureReader,
    Goto(Position),
    Position,
    Bounds,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown key or command: {0:?} (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

const VERB_HELP: &str = "\
verbs:
  ports | connect printer <port> | connect ad3 | disconnect printer|ad3
  goto <x> <y> <z> | position | bounds | status | help | quit";

/// Console help: the key table followed by the verbs.
pub fn help_text() -> String {
    // Bindings sharing a help line are listed together, in table order.
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for binding in keymap::DEFAULT_BINDINGS {
        let token = console_token(binding.key);
        match groups.iter_mut().find(|(help, _)| *help == binding.help) {
            Some((_, tokens)) => tokens.push(token),
            None => groups.push((binding.help, vec![token])),
        }
    }

    let mut out = String::from("keys:\n");
    for (help, tokens) in groups {
        let _ = writeln!(out, "  {:<16} {help}", tokens.join(" "));
    }
    out.push_str(VERB_HELP);
    out
}

/// One message per axis on which `target` lies outside `bounds`.
///
/// Informational only; the device does not enforce the envelope and the
/// move is sent regardless.
pub fn envelope_warnings(target: Position, bounds: &Bounds) -> Vec<String> {
    Axis::ALL
        .iter()
        .filter_map(|&axis| {
            let value = target.get(axis);
            let range = bounds.range(axis);
            (value < range.min || value > range.max)
                .then(|| format!("{axis} = {value} is outside [{}, {}]", range.min, range.max))
        })
        .collect()
}
/// Parses one console line.
pub fn parse_line(line: &str) -> Result<ConsoleInput, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&first, rest)) = words.split_first() else {
        return Err(ParseError::Empty);
    };

    match (first.to_ascii_lowercase().as_str(), rest) {
        ("quit" | "exit", []) => Ok(ConsoleInput::Quit),
        ("help" | "?", []) => Ok(ConsoleInput::Help),
        ("status", []) => Ok(ConsoleInput::Status),
        ("bounds", []) => Ok(ConsoleInput::Bounds),
        ("position", []) => Ok(ConsoleInput::Position),
        ("ports", []) => Ok(ConsoleInput::Ports),
        ("connect", ["printer", port]) => Ok(ConsoleInput::ConnectPrinter((*port).to_string())),
        ("connect", ["ad3"]) => Ok(ConsoleInput::ConnectPressureReader),
        ("connect", _) => Err(ParseError::Usage("connect printer <port> | connect ad3")),
        ("disconnect", ["printer"]) => Ok(ConsoleInput::DisconnectPrinter),
        ("disconnect", ["ad3"]) => Ok(ConsoleInput::DisconnectPressureReader),
        ("disconnect", _) => Err(ParseError::Usage("disconnect printer|ad3")),
        ("goto", [x, y, z]) => {
            let parse = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
            match (parse(*x), parse(*y), parse(*z)) {
                (Some(x), Some(y), Some(z)) => Ok(ConsoleInput::Goto(Position::new(x, y, z))),
                _ => Err(ParseError::Usage("goto <x> <y> <z>")),
            }
        }
        ("goto", _) => Err(ParseError::Usage("goto <x> <y> <z>")),
        (_, []) => key_events(first),
        _ => Err(ParseError::Unknown(line.trim().to_string())),
    }
}

/// Expands a key token into the events of one key press.
fn key_events(token: &str) -> Result<ConsoleInput, ParseError> {
    let lower = token.to_ascii_lowercase();
    let (shifted, key) = match lower.strip_prefix("shift+") {
        Some(key) => (true, key),
        None => (false, lower.as_str()),
    };
    let key = dom_key(key);
    if keymap::lookup(key).is_none() {
        return Err(ParseError::Unknown(token.to_string()));
    }

    let mut events = Vec::with_capacity(4);
    if shifted {
        events.push(KeyEvent::Down("Shift".to_string()));
    }
    events.push(KeyEvent::Down(key.to_string()));
    events.push(KeyEvent::Up(key.to_string()));
    if shifted {
        events.push(KeyEvent::Up("Shift".to_string()));
    }
    Ok(ConsoleInput::Keys(events))
}

/// Console token for a DOM key name; the inverse of [`dom_key`].
fn console_token(key: &str) -> &str {
    match key {
        "ArrowUp" => "up",
        "ArrowDown" => "down",
        "ArrowLeft" => "left",
        "ArrowRight" => "right",
        "PageUp" => "pgup",
        "PageDown" => "pgdn",
        "Space" => "space",
        "Shift" => "shift+<key>",
        other => other,
    }
}

fn dom_key(token: &str) -> &str {
    match token {
        "up" => "ArrowUp",
        "down" => "ArrowDown",
        "left" => "ArrowLeft",
        "right" => "ArrowRight",
        "pgup" => "PageUp",
        "pgdn" => "PageDown",
        "space" => "Space",
        other => other,
    }
}
