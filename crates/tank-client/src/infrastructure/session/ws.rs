//! WebSocket transport built on `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message as WsMessage,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

use super::transport::{Connection, Transport, TransportError};

/// Dials `ws://` and `wss://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Connection>, TransportError> {
        let (stream, response) =
            connect_async(endpoint)
                .await
                .map_err(|e| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;
        debug!(endpoint, status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(WsMessage::Text(frame))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text)),
                Ok(WsMessage::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => {
                        warn!("dropping non-UTF-8 binary frame");
                    }
                },
                Ok(WsMessage::Close(frame)) => {
                    debug!(?frame, "server closed the session");
                    return None;
                }
                // tungstenite answers pings itself.
                Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_)) => {}
                Err(e) => return Some(Err(TransportError::Io(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("error closing websocket: {e}");
        }
    }
}
