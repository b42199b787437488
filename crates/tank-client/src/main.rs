//! Scanning tank control client entry point.
//!
//! Opens the telemetry session to the device server, then runs a line-based
//! operator console on stdin.  Every telemetry change is rendered as one
//! status line on stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! tank-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>              TOML config file [env: TANK_CONFIG]
//!   --host <HOST[:PORT]>         device server [env: TANK_HOST]
//!   --secure                     use wss:// and https:// [env: TANK_SECURE]
//!   --reconnect-delay-ms <MS>    constant reconnect delay [env: TANK_RECONNECT_DELAY_MS]
//!   --write-config <PATH>        write the effective config as TOML and exit
//! ```
//!
//! Flags override the config file; the file overrides built-in defaults.
//! The log filter comes from `RUST_LOG`, falling back to `log_level` in the
//! config file.

mod console;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tank_client::application::dispatcher::CommandDispatcher;
use tank_client::application::input_router::InputRouter;
use tank_client::application::notices::{Notice, NoticeBoard};
use tank_client::application::telemetry::{TelemetrySnapshot, TelemetryStore, TelemetryView};
use tank_client::infrastructure::config::{load_config, save_config, ClientConfig};
use tank_client::infrastructure::session::{SessionLink, WsTransport};
use tank_client::infrastructure::HttpSideChannel;
use tank_core::{Axis, Bounds, CoordinateMapper};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{envelope_warnings, help_text, parse_line, ConsoleInput};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control client for the scanning tank rig.
#[derive(Debug, Parser)]
#[command(
    name = "tank-client",
    about = "Operator console for the scanning tank device server",
    version
)]
struct Cli {
    /// TOML configuration file.  A missing file means defaults.
    #[arg(long, env = "TANK_CONFIG")]
    config: Option<PathBuf>,

    /// Device server `host[:port]`.
    #[arg(long, env = "TANK_HOST")]
    host: Option<String>,

    /// Use TLS for both the session and the side channel.
    #[arg(long, env = "TANK_SECURE")]
    secure: bool,

    /// Delay between reconnect attempts, in milliseconds.
    #[arg(long, env = "TANK_RECONNECT_DELAY_MS")]
    reconnect_delay_ms: Option<u64>,

    /// Write the effective configuration to this path and exit.
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file (if any) and applies the flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if self.secure {
            config.server.secure = true;
        }
        if let Some(ms) = self.reconnect_delay_ms {
            config.session.reconnect_delay_ms = ms;
        }
        Ok(config)
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// How often the render loop checks for expired notices.
const NOTICE_POLL: Duration = Duration::from_millis(250);

fn render(snapshot: &TelemetrySnapshot, mapper: &CoordinateMapper, notices: &[String]) -> String {
    let n = mapper.to_normalized(snapshot.position);
    let confirmed = if snapshot.position_confirmed { "" } else { " (unconfirmed)" };
    let pressure = snapshot
        .pressure
        .map(|p| p.to_string())
        .unwrap_or_else(|| "--".to_string());
    let mut line = format!(
        "[{}] device {}{} | view ({:.2}, {:.2}, {:.2}) | pressure {}",
        snapshot.connectivity, snapshot.position, confirmed, n.x, n.y, n.z, pressure
    );
    if !notices.is_empty() {
        line.push_str(" | ! ");
        line.push_str(&notices.join("; "));
    }
    line
}

/// One event from the notice channel, as the render loop sees it.
#[derive(Debug, PartialEq)]
enum NoticeEvent {
    Raised(String),
    /// The receiver fell behind and `n` notices were skipped.
    Missed(u64),
    BoardGone,
}

impl From<Result<Notice, RecvError>> for NoticeEvent {
    fn from(result: Result<Notice, RecvError>) -> Self {
        match result {
            Ok(notice) => NoticeEvent::Raised(notice.message),
            Err(RecvError::Lagged(n)) => NoticeEvent::Missed(n),
            Err(RecvError::Closed) => NoticeEvent::BoardGone,
        }
    }
}

/// What woke the render loop.
enum Wake {
    Telemetry(bool),
    Notice(NoticeEvent),
    Tick,
}

/// Prints a status line on every telemetry change, every new notice and
/// every notice expiry.
async fn render_loop(
    mut view: TelemetryView,
    notices: Arc<NoticeBoard>,
    mapper: CoordinateMapper,
) {
    let mut raised = notices.subscribe();
    let mut tick = tokio::time::interval(NOTICE_POLL);
    let mut shown = notices.active();

    loop {
        let wake = tokio::select! {
            alive = view.changed() => Wake::Telemetry(alive),
            event = raised.recv() => Wake::Notice(event.into()),
            _ = tick.tick() => Wake::Tick,
        };

        let changed = match wake {
            Wake::Telemetry(false) | Wake::Notice(NoticeEvent::BoardGone) => break,
            Wake::Telemetry(true) => true,
            Wake::Notice(NoticeEvent::Raised(message)) => {
                println!("! {message}");
                true
            }
            Wake::Notice(NoticeEvent::Missed(n)) => {
                warn!(missed = n, "notice display fell behind");
                true
            }
            Wake::Tick => false,
        };

        let active = notices.active();
        if changed || active != shown {
            shown = active;
            println!("{}", render(&view.snapshot(), &mapper, &shown));
        }
    }
}

// ── Console ───────────────────────────────────────────────────────────────────

async fn run_console(
    dispatcher: &CommandDispatcher,
    view: &TelemetryView,
    notices: &NoticeBoard,
    mapper: &CoordinateMapper,
) -> anyhow::Result<()> {
    let mut router = InputRouter::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", help_text());

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let input = match parse_line(&line) {
            Ok(input) => input,
            Err(console::ParseError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        // Side-channel failures are already raised as notices by the
        // dispatcher, so results are only inspected for output.
        match input {
            ConsoleInput::Keys(events) => {
                for event in &events {
                    if let Some(command) = router.handle(event) {
                        let _ = dispatcher.dispatch(command).await;
                    }
                }
            }
            ConsoleInput::Ports => {
                if let Ok(ports) = dispatcher.list_ports().await {
                    if ports.is_empty() {
                        println!("no serial ports found");
                    }
                    for port in ports {
                        println!("{}  {}", port.device, port.description);
                    }
                }
            }
            ConsoleInput::ConnectPrinter(port) => {
                if dispatcher.connect_printer(&port).await.is_ok() {
                    println!("printer connected on {port}");
                }
            }
            ConsoleInput::ConnectPressureReader => {
                if dispatcher.connect_pressure_reader().await.is_ok() {
                    println!("pressure reader connected");
                }
            }
            ConsoleInput::DisconnectPrinter => {
                let _ = dispatcher.disconnect_printer().await;
            }
            ConsoleInput::DisconnectPressureReader => {
                let _ = dispatcher.disconnect_pressure_reader().await;
            }
            ConsoleInput::Goto(target) => {
                for warning in envelope_warnings(target, &Bounds::RIG) {
                    println!("warning: {warning}");
                }
                let _ = dispatcher.move_to(target).await;
            }
            ConsoleInput::Position => {
                if let Ok(position) = dispatcher.refresh_position().await {
                    println!("device reports {position}");
                }
            }
            ConsoleInput::Bounds => {
                if let Ok(bounds) = dispatcher.bounds().await {
                    let ranges: Vec<String> = Axis::ALL
                        .iter()
                        .map(|&axis| {
                            let r = bounds.range(axis);
                            format!("{axis} [{}, {}]", r.min, r.max)
                        })
                        .collect();
                    println!("{}", ranges.join("  "));
                }
            }
            ConsoleInput::Status => {
                println!("{}", render(&view.snapshot(), mapper, &notices.active()));
            }
            ConsoleInput::Help => println!("{}", help_text()),
            ConsoleInput::Quit => break,
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let write_to = cli.write_config.clone();
    let config = cli.into_client_config()?;

    if let Some(path) = write_to {
        save_config(&path, &config)
            .with_context(|| format!("writing config to {}", path.display()))?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    // Logs go to stderr so the console output on stdout stays readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        session = %config.ws_endpoint(),
        api = %config.api_base_url(),
        "scanning tank client starting"
    );

    let store = Arc::new(TelemetryStore::new());
    let notices = Arc::new(NoticeBoard::new(config.notice_window()));
    let view = store.view();
    let mapper = CoordinateMapper::new(Bounds::RIG);

    let side = HttpSideChannel::new(config.api_base_url(), config.request_timeout())
        .context("building HTTP side channel")?;
    let link = SessionLink::open(
        WsTransport,
        config.session_config(),
        Arc::clone(&store),
        Arc::clone(&notices),
    );
    let dispatcher = CommandDispatcher::new(
        Arc::new(link.handle()),
        Arc::new(side),
        Arc::clone(&store),
        Arc::clone(&notices),
    );

    let renderer = tokio::spawn(render_loop(view.clone(), Arc::clone(&notices), mapper));

    let result = run_console(&dispatcher, &view, &notices, &mapper).await;
    if let Err(e) = &result {
        warn!("console stopped: {e:#}");
    }

    link.shutdown().await;
    renderer.abort();
    info!("scanning tank client stopped");
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tank_core::{ConnectivityState, Position, Pressure};

    #[test]
    fn test_cli_defaults_produce_default_config() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["tank-client"]);

        // Act
        let config = cli.into_client_config().unwrap();

        // Assert
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_cli_host_override() {
        let cli = Cli::parse_from(["tank-client", "--host", "10.0.0.5:8000"]);
        let config = cli.into_client_config().unwrap();
        assert_eq!(config.ws_endpoint(), "ws://10.0.0.5:8000/ws");
    }

    #[test]
    fn test_cli_secure_and_delay_override() {
        let cli = Cli::parse_from(["tank-client", "--secure", "--reconnect-delay-ms", "250"]);
        let config = cli.into_client_config().unwrap();
        assert!(config.server.secure);
        assert_eq!(config.session.reconnect_delay_ms, 250);
    }

    #[test]
    fn test_cli_missing_config_file_is_defaults() {
        let cli = Cli::parse_from([
            "tank-client",
            "--config",
            "/nonexistent/tank-client/config.toml",
        ]);
        assert_eq!(cli.into_client_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_render_marks_unconfirmed_placeholder() {
        let snapshot = TelemetrySnapshot {
            position: Position::HOME_PLACEHOLDER,
            position_confirmed: false,
            pressure: None,
            connectivity: ConnectivityState::Connecting,
        };

        let line = render(&snapshot, &CoordinateMapper::default(), &[]);

        assert_eq!(
            line,
            "[connecting] device (0.00, 0.00, 180.00) (unconfirmed) | view (0.00, 7.50, -37.50) | pressure --"
        );
    }

    #[test]
    fn test_render_confirmed_with_pressure() {
        let snapshot = TelemetrySnapshot {
            position: Position::new(10.0, -47.5, 172.5),
            position_confirmed: true,
            pressure: Some(Pressure::from_kilopascals(12.3)),
            connectivity: ConnectivityState::Open,
        };

        let line = render(&snapshot, &CoordinateMapper::default(), &[]);

        assert_eq!(
            line,
            "[open] device (10.00, -47.50, 172.50) | view (10.00, 0.00, 10.00) | pressure 12.30 kPa"
        );
    }

    #[test]
    fn test_render_appends_active_notices() {
        let snapshot = TelemetrySnapshot {
            position: Position::HOME_PLACEHOLDER,
            position_confirmed: true,
            pressure: None,
            connectivity: ConnectivityState::Open,
        };
        let notices = vec!["stall".to_string(), "home failed: busy".to_string()];

        let line = render(&snapshot, &CoordinateMapper::default(), &notices);

        assert!(line.ends_with(" | ! stall; home failed: busy"), "{line}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_notice_receiver_keeps_listening() {
        // Arrange: overflow the notice channel before reading
        let board = NoticeBoard::default();
        let mut raised = board.subscribe();
        for i in 0..40 {
            board.raise(format!("notice {i}"));
        }

        // Act
        let first = NoticeEvent::from(raised.recv().await);
        let next = NoticeEvent::from(raised.recv().await);

        // Assert
        assert_eq!(first, NoticeEvent::Missed(8));
        assert_eq!(next, NoticeEvent::Raised("notice 8".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_board_ends_notice_stream() {
        let board = NoticeBoard::default();
        let mut raised = board.subscribe();
        drop(board);

        assert_eq!(NoticeEvent::from(raised.recv().await), NoticeEvent::BoardGone);
    }

    #[test]
    fn test_write_config_flag() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("tank-client-main-{}", std::process::id()));
        let path = dir.join("client.toml");
        let cli = Cli::parse_from([
            "tank-client",
            "--host",
            "rig.lab:9000",
            "--write-config",
            path.to_str().unwrap(),
        ]);

        // Act
        let write_to = cli.write_config.clone().unwrap();
        let config = cli.into_client_config().unwrap();
        save_config(&write_to, &config).unwrap();

        // Assert
        assert_eq!(load_config(&path).unwrap().server.host, "rig.lab:9000");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
