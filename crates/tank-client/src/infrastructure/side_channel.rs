//! HTTP side channel to the device server's REST API.
//!
//! Every operation is one request and one JSON reply.  Replies that carry a
//! `status` go through [`ReplyEnvelope`] so any status other than `"ok"`
//! becomes [`SideChannelError::Rejected`] with the server's message.  The
//! connect calls also accept `"connected"` and the disconnect calls
//! `"disconnected"`.  The plain-data endpoints (`/ports`, `/position`,
//! `/bounds`) return bare JSON.
//!
//! | operation                      | request                                  |
//! |--------------------------------|------------------------------------------|
//! | `home`                         | `POST {base}/home`                       |
//! | `list_ports`                   | `GET  {base}/ports`                      |
//! | `connect_printer`              | `POST {base}/connect/printer?port=`      |
//! | `connect_pressure_reader`      | `POST {base}/connect/ad3`                |
//! | `disconnect_printer`           | `POST {base}/disconnect/printer`         |
//! | `disconnect_pressure_reader`   | `POST {base}/disconnect/ad3`             |
//! | `position`                     | `GET  {base}/position`                   |
//! | `bounds`                       | `GET  {base}/bounds`                     |
//! | `move_to`                      | `POST {base}/move?x=&y=&z=`              |
//! | `move_relative`                | `POST {base}/move/relative?dx=&dy=&dz=`  |
//! | `read_pressure`                | `GET  {base}/pressure`                   |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tank_core::protocol::reply::{CONNECT_STATUSES, DISCONNECT_STATUSES, OK_STATUSES};
use tank_core::{Bounds, Direction, Position, Pressure, ReplyEnvelope, StepSize};
use tracing::debug;

use crate::application::ports::{PortInfo, SideChannel, SideChannelError};

#[derive(Debug, Deserialize)]
struct PositionPayload {
    position: Position,
}

#[derive(Debug, Deserialize)]
struct PressurePayload {
    pressure: Pressure,
}

/// [`SideChannel`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSideChannel {
    http: Client,
    base_url: String,
}

impl HttpSideChannel {
    /// Creates a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:8000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`SideChannelError::Request`] if the HTTP client cannot be
    /// built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SideChannelError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SideChannelError::Request {
                endpoint: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends `request` and returns the body of a 2xx response.
    async fn fetch(&self, url: &str, request: RequestBuilder) -> Result<String, SideChannelError> {
        let failed = |e: reqwest::Error| SideChannelError::Request {
            endpoint: url.to_string(),
            message: e.to_string(),
        };
        debug!(url, "side-channel request");
        let body = request
            .send()
            .await
            .map_err(failed)?
            .error_for_status()
            .map_err(failed)?
            .text()
            .await
            .map_err(failed)?;
        debug!(url, body = %body, "side-channel reply");
        Ok(body)
    }

    /// Request whose reply is a bare JSON value.
    async fn get_plain<T: DeserializeOwned>(&self, path: &str) -> Result<T, SideChannelError> {
        let url = self.url(path);
        let body = self.fetch(&url, self.http.get(&url)).await?;
        serde_json::from_str(&body).map_err(|e| SideChannelError::Malformed(e.to_string()))
    }

    /// Request whose reply is a status envelope; `accepted` lists the
    /// statuses that count as success for this call.
    async fn enveloped<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
        accepted: &[&str],
    ) -> Result<T, SideChannelError> {
        let body = self.fetch(url, request).await?;
        Ok(ReplyEnvelope::parse(&body)?.into_payload_with(accepted)?)
    }

    async fn post_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        accepted: &[&str],
    ) -> Result<T, SideChannelError> {
        let url = self.url(path);
        self.enveloped(&url, self.http.post(&url), accepted).await
    }
}

#[async_trait]
impl SideChannel for HttpSideChannel {
    async fn home(&self) -> Result<Position, SideChannelError> {
        let reply: PositionPayload = self.post_enveloped("/home", OK_STATUSES).await?;
        Ok(reply.position)
    }

    async fn list_ports(&self) -> Result<Vec<PortInfo>, SideChannelError> {
        self.get_plain("/ports").await
    }

    async fn connect_printer(&self, port: &str) -> Result<Position, SideChannelError> {
        let url = self.url("/connect/printer");
        let request = self.http.post(&url).query(&[("port", port)]);
        let reply: PositionPayload = self.enveloped(&url, request, CONNECT_STATUSES).await?;
        Ok(reply.position)
    }

    async fn connect_pressure_reader(&self) -> Result<(), SideChannelError> {
        let _: IgnoredAny = self.post_enveloped("/connect/ad3", CONNECT_STATUSES).await?;
        Ok(())
    }

    async fn disconnect_printer(&self) -> Result<(), SideChannelError> {
        let _: IgnoredAny = self.post_enveloped("/disconnect/printer", DISCONNECT_STATUSES).await?;
        Ok(())
    }

    async fn disconnect_pressure_reader(&self) -> Result<(), SideChannelError> {
        let _: IgnoredAny = self.post_enveloped("/disconnect/ad3", DISCONNECT_STATUSES).await?;
        Ok(())
    }

    async fn position(&self) -> Result<Position, SideChannelError> {
        self.get_plain("/position").await
    }

    async fn bounds(&self) -> Result<Bounds, SideChannelError> {
        self.get_plain("/bounds").await
    }

    async fn move_to(&self, target: Position) -> Result<Position, SideChannelError> {
        let url = self.url("/move");
        let request = self
            .http
            .post(&url)
            .query(&[("x", target.x), ("y", target.y), ("z", target.z)]);
        let reply: PositionPayload = self.enveloped(&url, request, OK_STATUSES).await?;
        Ok(reply.position)
    }

    async fn move_relative(
        &self,
        direction: Direction,
        step: StepSize,
    ) -> Result<Position, SideChannelError> {
        let (dx, dy, dz) = direction.delta(step);
        let url = self.url("/move/relative");
        let request = self
            .http
            .post(&url)
            .query(&[("dx", dx), ("dy", dy), ("dz", dz)]);
        let reply: PositionPayload = self.enveloped(&url, request, OK_STATUSES).await?;
        Ok(reply.position)
    }

    async fn read_pressure(&self) -> Result<Pressure, SideChannelError> {
        let url = self.url("/pressure");
        let reply: PressurePayload = self.enveloped(&url, self.http.get(&url), OK_STATUSES).await?;
        Ok(reply.pressure)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
