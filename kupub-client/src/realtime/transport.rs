use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::RealtimeError;
use super::stomp::{HEARTBEAT, StompFrame};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A connected, frame-level STOMP pipe
#[async_trait]
pub trait StompTransport: Send {
    async fn send(&mut self, frame: StompFrame) -> Result<(), RealtimeError>;

    /// Send a heart-beat end-of-line
    async fn heartbeat(&mut self) -> Result<(), RealtimeError>;

    /// Next frame, skipping heart-beats. `Ok(None)` once the peer closed.
    async fn next(&mut self) -> Result<Option<StompFrame>, RealtimeError>;

    async fn close(&mut self) -> Result<(), RealtimeError>;
}

/// Opens transports to a broker endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn StompTransport>, RealtimeError>;
}

/// tokio-tungstenite connector, one STOMP frame per text message
#[derive(Debug, Clone)]
pub struct WsConnector {
    sockjs_raw_path: bool,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            sockjs_raw_path: true,
        }
    }
}

impl WsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to the endpoint as given, without the SockJS raw path
    pub fn plain() -> Self {
        Self {
            sockjs_raw_path: false,
        }
    }

    /// SockJS endpoints (`.../ws`) accept raw WebSocket on `.../ws/websocket`
    pub fn resolve(&self, url: &str) -> String {
        let trimmed = url.trim_end_matches('/');
        if self.sockjs_raw_path && trimmed.ends_with("/ws") {
            format!("{trimmed}/websocket")
        } else {
            url.to_string()
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn StompTransport>, RealtimeError> {
        let target = self.resolve(url);
        if !(target.starts_with("ws://") || target.starts_with("wss://")) {
            return Err(RealtimeError::InvalidEndpoint(target));
        }
        tracing::debug!(url = %target, "Opening WebSocket");
        let (stream, _response) = tokio_tungstenite::connect_async(target.as_str()).await?;
        Ok(Box::new(WsTransport { stream }))
    }
}

struct WsTransport {
    stream: WsStream,
}

#[async_trait]
impl StompTransport for WsTransport {
    async fn send(&mut self, frame: StompFrame) -> Result<(), RealtimeError> {
        self.stream.send(Message::Text(frame.encode().into())).await?;
        Ok(())
    }

    async fn heartbeat(&mut self) -> Result<(), RealtimeError> {
        self.stream.send(Message::Text(HEARTBEAT.to_string().into())).await?;
        Ok(())
    }

    async fn next(&mut self) -> Result<Option<StompFrame>, RealtimeError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };
            match message? {
                Message::Text(text) => {
                    if let Some(frame) = StompFrame::parse(text.as_str())? {
                        return Ok(Some(frame));
                    }
                }
                Message::Binary(bytes) => {
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| RealtimeError::Frame(e.to_string()))?;
                    if let Some(frame) = StompFrame::parse(text)? {
                        return Ok(Some(frame));
                    }
                }
                Message::Ping(payload) => {
                    self.stream.send(Message::Pong(payload)).await?;
                }
                Message::Close(_) => return Ok(None),
                Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), RealtimeError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockjs_raw_path() {
        let connector = WsConnector::new();
        assert_eq!(connector.resolve("ws://a.test/ws"), "ws://a.test/ws/websocket");
        assert_eq!(connector.resolve("wss://a.test/ws/"), "wss://a.test/ws/websocket");
        assert_eq!(connector.resolve("ws://a.test/stomp"), "ws://a.test/stomp");
        assert_eq!(WsConnector::plain().resolve("ws://a.test/ws"), "ws://a.test/ws");
    }

    #[tokio::test]
    async fn test_rejects_non_ws_scheme() {
        let result = WsConnector::new().connect("http://a.test/ws").await;
        assert!(matches!(result, Err(RealtimeError::InvalidEndpoint(_))));
    }
}
