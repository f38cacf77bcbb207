//! Realtime notification channel
//!
//! STOMP over WebSocket, subscribed to the department or per-order topics
//! published by the backend. Notifications are delivered on a broadcast
//! channel; connection state on a watch channel. The channel reconnects
//! with capped exponential backoff and gives up after a bounded number of
//! consecutive failures.

mod backoff;
mod channel;
pub mod stomp;
mod transport;

pub use backoff::Backoff;
pub use channel::{RealtimeChannel, RealtimeHandle};
pub use stomp::StompFrame;
pub use transport::{Connector, StompTransport, WsConnector};

use shared::message::OrderNotification;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed STOMP frame: {0}")]
    Frame(String),

    /// ERROR frame from the broker
    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection closed")]
    Closed,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Event delivered to subscribers of a [`RealtimeHandle`]
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Notification {
        /// Destination the message arrived on
        topic: String,
        notification: OrderNotification,
    },
}

impl RealtimeEvent {
    pub fn notification(&self) -> &OrderNotification {
        match self {
            RealtimeEvent::Notification { notification, .. } => notification,
        }
    }
}

/// Connection state of a realtime channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Socket or STOMP handshake in progress
    Connecting,
    /// Connected and subscribed
    Live,
    /// Waiting `delay` before reconnect attempt number `attempt`
    Reconnecting { attempt: u32, delay: Duration },
    /// Gave up after too many consecutive failures
    Failed,
    /// Shut down by the owner
    Closed,
}

impl ConnectionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionStatus::Live)
    }

    /// No further connection attempts will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionStatus::Failed | ConnectionStatus::Closed)
    }
}
