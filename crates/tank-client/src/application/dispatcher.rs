//! CommandDispatcher: operator actions and the channel each one travels on.
//!
//! | action                  | channel      | result                                   |
//! |-------------------------|--------------|------------------------------------------|
//! | [`jog`]                 | session link | fire-and-forget; dropped unless `Open`    |
//! | [`read_pressure`]       | session link | reply arrives later as `pressure` frame   |
//! | [`home`]                | side channel | reply position overwrites telemetry       |
//! | [`connect_printer`]     | side channel | reply position overwrites telemetry       |
//! | [`move_to`]             | side channel | reply position overwrites telemetry       |
//! | [`move_relative`]       | side channel | reply position overwrites telemetry       |
//! | [`read_pressure_now`]   | side channel | reply pressure overwrites telemetry       |
//!
//! A failed side-channel call raises a notice and leaves telemetry untouched.
//! Side-channel calls are not gated on the session state; they do not use it.
//!
//! [`jog`]: CommandDispatcher::jog
//! [`read_pressure`]: CommandDispatcher::read_pressure
//! [`home`]: CommandDispatcher::home
//! [`connect_printer`]: CommandDispatcher::connect_printer
//! [`move_to`]: CommandDispatcher::move_to
//! [`move_relative`]: CommandDispatcher::move_relative
//! [`read_pressure_now`]: CommandDispatcher::read_pressure_now

use std::sync::Arc;

use tank_core::{Bounds, Command, Direction, Position, Pressure, StepSize};
use tracing::{debug, info};

use crate::application::notices::NoticeBoard;
use crate::application::ports::{CommandLink, PortInfo, SideChannel, SideChannelError};
use crate::application::telemetry::{TelemetryStore, TelemetryUpdate};

/// Routes operator actions to the session link or the side channel.
pub struct CommandDispatcher {
    link: Arc<dyn CommandLink>,
    side: Arc<dyn SideChannel>,
    store: Arc<TelemetryStore>,
    notices: Arc<NoticeBoard>,
}

impl CommandDispatcher {
    pub fn new(
        link: Arc<dyn CommandLink>,
        side: Arc<dyn SideChannel>,
        store: Arc<TelemetryStore>,
        notices: Arc<NoticeBoard>,
    ) -> Self {
        Self {
            link,
            side,
            store,
            notices,
        }
    }

    // ── Session link actions ──────────────────────────────────────────────────

    /// Jogs the stage one `step` in `direction`.
    pub fn jog(&self, direction: Direction, step: StepSize) {
        self.send_if_open(Command::Move { direction, step });
    }

    /// Requests a pressure sample.  The value shows up in telemetry when the
    /// server's `pressure` frame arrives.
    pub fn read_pressure(&self) {
        self.send_if_open(Command::ReadPressure);
    }

    fn send_if_open(&self, command: Command) {
        let state = self.link.connectivity();
        if state.is_open() {
            self.link.send(command);
        } else {
            debug!(command = command.name(), %state, "link not open; command dropped");
        }
    }

    /// Dispatches any [`Command`] on the channel it belongs to.
    ///
    /// # Errors
    ///
    /// Only [`Command::Home`] can fail; see [`CommandDispatcher::home`].
    pub async fn dispatch(&self, command: Command) -> Result<(), SideChannelError> {
        match command {
            Command::Move { direction, step } => self.jog(direction, step),
            Command::ReadPressure => self.read_pressure(),
            Command::Home => {
                self.home().await?;
            }
        }
        Ok(())
    }

    // ── Side channel actions ──────────────────────────────────────────────────

    /// Homes all axes and stores the returned position.
    ///
    /// # Errors
    ///
    /// Returns the side-channel error after raising it as a notice.  The
    /// stored position is left unchanged.
    pub async fn home(&self) -> Result<Position, SideChannelError> {
        let result = self.side.home().await;
        self.accept_position("home", result)
    }

    /// Opens the motion controller on `port` and stores its position.
    pub async fn connect_printer(&self, port: &str) -> Result<Position, SideChannelError> {
        let result = self.side.connect_printer(port).await;
        self.accept_position("connect printer", result)
    }

    /// Absolute move; stores the position the device ends up at.
    pub async fn move_to(&self, target: Position) -> Result<Position, SideChannelError> {
        let result = self.side.move_to(target).await;
        self.accept_position("move", result)
    }

    /// Relative move over the side channel; stores the resulting position.
    pub async fn move_relative(
        &self,
        direction: Direction,
        step: StepSize,
    ) -> Result<Position, SideChannelError> {
        let result = self.side.move_relative(direction, step).await;
        self.accept_position("relative move", result)
    }

    /// Reads pressure synchronously and stores it like a telemetry frame.
    pub async fn read_pressure_now(&self) -> Result<Pressure, SideChannelError> {
        let result = self.side.read_pressure().await;
        let pressure = self.surface("read pressure", result)?;
        self.store.apply(TelemetryUpdate::Pressure(pressure));
        Ok(pressure)
    }

    /// Re-reads the position without moving and stores it.
    pub async fn refresh_position(&self) -> Result<Position, SideChannelError> {
        let result = self.side.position().await;
        self.accept_position("read position", result)
    }

    pub async fn list_ports(&self) -> Result<Vec<PortInfo>, SideChannelError> {
        let result = self.side.list_ports().await;
        self.surface("list ports", result)
    }

    pub async fn connect_pressure_reader(&self) -> Result<(), SideChannelError> {
        let result = self.side.connect_pressure_reader().await;
        self.surface("connect pressure reader", result)
    }

    pub async fn disconnect_printer(&self) -> Result<(), SideChannelError> {
        let result = self.side.disconnect_printer().await;
        self.surface("disconnect printer", result)
    }

    pub async fn disconnect_pressure_reader(&self) -> Result<(), SideChannelError> {
        let result = self.side.disconnect_pressure_reader().await;
        self.surface("disconnect pressure reader", result)
    }

    pub async fn bounds(&self) -> Result<Bounds, SideChannelError> {
        let result = self.side.bounds().await;
        self.surface("read bounds", result)
    }

    /// Stores an authoritative position from a successful reply.
    fn accept_position(
        &self,
        action: &str,
        result: Result<Position, SideChannelError>,
    ) -> Result<Position, SideChannelError> {
        let position = self.surface(action, result)?;
        info!(action, %position, "authoritative position from side channel");
        self.store.apply(TelemetryUpdate::Position(position));
        Ok(position)
    }

    /// Raises a notice for a failed call and passes the result through.
    fn surface<T>(
        &self,
        action: &str,
        result: Result<T, SideChannelError>,
    ) -> Result<T, SideChannelError> {
        result.map_err(|e| {
            self.notices.raise(format!("{action} failed: {e}"));
            e
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
