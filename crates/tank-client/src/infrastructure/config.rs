//! TOML configuration for the control client.
//!
//! Every field has a default, so an empty (or missing) file is a valid
//! configuration:
//!
//! ```toml
//! log_level = "info"
//!
//! [server]
//! host = "localhost:8000"
//! secure = false
//!
//! [session]
//! reconnect_delay_ms = 1000
//! connect_timeout_ms = 5000
//! notice_window_ms = 5000
//! request_timeout_ms = 10000
//! ```
//!
//! Both endpoints are derived from `server.host`: the telemetry session at
//! `ws[s]://{host}/ws` and the REST side channel at `http[s]://{host}/api`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::session::SessionConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionSettings,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the device server lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// `host[:port]` of the device server.
    #[serde(default = "default_host")]
    pub host: String,
    /// Use `wss://` and `https://`.
    #[serde(default)]
    pub secure: bool,
}

/// Session timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Constant delay between reconnect attempts.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Limit on one session connection attempt.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// How long an operator notice stays visible.
    #[serde(default = "default_notice_window_ms")]
    pub notice_window_ms: u64,
    /// Side-channel HTTP timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_host() -> String {
    "localhost:8000".to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    1000
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_notice_window_ms() -> u64 {
    5000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: false,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            notice_window_ms: default_notice_window_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

// ── Derived settings ──────────────────────────────────────────────────────────

impl ClientConfig {
    /// Telemetry session URL.
    pub fn ws_endpoint(&self) -> String {
        let scheme = if self.server.secure { "wss" } else { "ws" };
        format!("{scheme}://{}/ws", self.host())
    }

    /// Base URL of the REST side channel.
    pub fn api_base_url(&self) -> String {
        let scheme = if self.server.secure { "https" } else { "http" };
        format!("{scheme}://{}/api", self.host())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.ws_endpoint(),
            reconnect_delay: Duration::from_millis(self.session.reconnect_delay_ms),
            connect_timeout: Duration::from_millis(self.session.connect_timeout_ms),
        }
    }

    pub fn notice_window(&self) -> Duration {
        Duration::from_millis(self.session.notice_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.session.request_timeout_ms)
    }

    /// Host with any scheme or trailing slash the operator pasted in removed.
    fn host(&self) -> &str {
        let host = self.server.host.trim();
        let host = host
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(host);
        host.trim_end_matches('/')
    }
}

// ── Load / save ───────────────────────────────────────────────────────────────

/// Loads a [`ClientConfig`] from `path`, returning defaults if the file does
/// not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Arrange / Act
        let cfg = ClientConfig::default();

        // Assert
        assert_eq!(cfg.server.host, "localhost:8000");
        assert!(!cfg.server.secure);
        assert_eq!(cfg.session.reconnect_delay_ms, 1000);
        assert_eq!(cfg.session_config().connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.notice_window(), Duration::from_secs(5));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_endpoints_derive_from_host() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.ws_endpoint(), "ws://localhost:8000/ws");
        assert_eq!(cfg.api_base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_secure_endpoints() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "rig.lab:443".to_string();
        cfg.server.secure = true;

        assert_eq!(cfg.ws_endpoint(), "wss://rig.lab:443/ws");
        assert_eq!(cfg.api_base_url(), "https://rig.lab:443/api");
    }

    #[test]
    fn test_host_with_scheme_and_slash_is_normalized() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "http://10.0.0.7:8000/".to_string();
        assert_eq!(cfg.ws_endpoint(), "ws://10.0.0.7:8000/ws");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        // Arrange
        let toml_str = "[session]\nreconnect_delay_ms = 250\n";

        // Act
        let cfg: ClientConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(cfg.session_config().reconnect_delay, Duration::from_millis(250));
        assert_eq!(cfg.session.notice_window_ms, 5000);
        assert_eq!(cfg.server.host, "localhost:8000");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("tank-client-config-does-not-exist.toml");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("tank-client-cfg-{}", std::process::id()));
        let path = dir.join("client.toml");
        let mut cfg = ClientConfig::default();
        cfg.server.host = "scanner.local:9000".to_string();

        // Act
        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result: Result<ClientConfig, _> = toml::from_str("[server\nhost = 1");
        assert!(result.is_err());
    }
}
