use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use shared::message::{OrderNotification, topic};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::stomp::{CONNECTED, ERROR, MESSAGE, StompFrame};
use super::{Backoff, ConnectionStatus, Connector, RealtimeError, RealtimeEvent, StompTransport};
use crate::config::{ClientConfig, RealtimeConfig};

/// Buffered events per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 256;
/// Time allowed for UNSUBSCRIBE/DISCONNECT on shutdown
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a live session ended
enum SessionEnd {
    Shutdown,
    Lost(RealtimeError),
}

/// Background task owning one logical subscription set
pub struct RealtimeChannel {
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
    url: String,
    topics: Vec<String>,
    events: broadcast::Sender<RealtimeEvent>,
    status: watch::Sender<ConnectionStatus>,
    shutdown: CancellationToken,
}

impl RealtimeChannel {
    /// Start the channel on the current tokio runtime
    pub fn spawn(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        url: impl Into<String>,
        topics: Vec<String>,
    ) -> RealtimeHandle {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (status, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let shutdown = CancellationToken::new();

        let channel = RealtimeChannel {
            connector,
            config,
            url: url.into(),
            topics,
            events: events.clone(),
            status,
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(channel.run());

        RealtimeHandle {
            events,
            status: status_rx,
            shutdown,
            task: Some(task),
        }
    }

    /// Connect, pump, reconnect with backoff until shutdown or give-up
    async fn run(self) {
        tracing::info!(url = %self.url, topics = ?self.topics, "Realtime channel started");
        let mut backoff = Backoff::new(&self.config);

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let opened = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.open() => result,
            };

            match opened {
                Ok(mut transport) => {
                    backoff.reset();
                    self.status.send_replace(ConnectionStatus::Live);
                    tracing::info!(url = %self.url, "Realtime channel live");

                    match self.pump(transport.as_mut()).await {
                        SessionEnd::Shutdown => {
                            self.teardown(transport.as_mut()).await;
                            break;
                        }
                        SessionEnd::Lost(e) => {
                            tracing::warn!("Realtime connection lost: {e}");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt = backoff.failures() + 1, "Realtime connect failed: {e}");
                }
            }

            let Some(delay) = backoff.next_delay() else {
                tracing::error!(
                    failures = backoff.failures(),
                    "Realtime channel giving up; falling back to polling"
                );
                self.status.send_replace(ConnectionStatus::Failed);
                return;
            };

            self.status.send_replace(ConnectionStatus::Reconnecting {
                attempt: backoff.failures(),
                delay,
            });
            tracing::info!(delay_ms = delay.as_millis() as u64, "Realtime reconnect scheduled");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {},
            }
            self.status.send_replace(ConnectionStatus::Connecting);
        }

        self.status.send_replace(ConnectionStatus::Closed);
        tracing::info!(url = %self.url, "Realtime channel stopped");
    }

    /// Socket plus STOMP handshake, bounded by `connect_timeout`
    async fn open(&self) -> Result<Box<dyn StompTransport>, RealtimeError> {
        let limit = self.config.connect_timeout;
        tokio::time::timeout(limit, self.handshake())
            .await
            .map_err(|_| RealtimeError::Timeout(limit))?
    }

    async fn handshake(&self) -> Result<Box<dyn StompTransport>, RealtimeError> {
        let mut transport = self.connector.connect(&self.url).await?;

        let heartbeat_ms = self.config.heartbeat.as_millis() as u64;
        transport
            .send(StompFrame::connect(&host_of(&self.url), heartbeat_ms))
            .await?;

        loop {
            match transport.next().await? {
                Some(frame) if frame.is(CONNECTED) => break,
                Some(frame) if frame.is(ERROR) => return Err(broker_error(&frame)),
                Some(frame) => {
                    tracing::debug!(%frame, "Ignoring frame before CONNECTED");
                }
                None => return Err(RealtimeError::Closed),
            }
        }

        for (index, destination) in self.topics.iter().enumerate() {
            transport
                .send(StompFrame::subscribe(&subscription_id(index), destination))
                .await?;
            tracing::debug!(destination = %destination, "Subscribed");
        }

        Ok(transport)
    }

    /// Forward messages until the session breaks or shutdown is requested
    async fn pump(&self, transport: &mut dyn StompTransport) -> SessionEnd {
        let heartbeat_enabled = !self.config.heartbeat.is_zero();
        let period = if heartbeat_enabled {
            self.config.heartbeat
        } else {
            Duration::from_secs(3600)
        };
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return SessionEnd::Shutdown,

                _ = heartbeat.tick(), if heartbeat_enabled => {
                    if let Err(e) = transport.heartbeat().await {
                        return SessionEnd::Lost(e);
                    }
                }

                next = transport.next() => match next {
                    Ok(Some(frame)) => {
                        if let Err(e) = self.dispatch(frame) {
                            return SessionEnd::Lost(e);
                        }
                    }
                    Ok(None) => return SessionEnd::Lost(RealtimeError::Closed),
                    Err(e) => return SessionEnd::Lost(e),
                },
            }
        }
    }

    fn dispatch(&self, frame: StompFrame) -> Result<(), RealtimeError> {
        if frame.is(ERROR) {
            return Err(broker_error(&frame));
        }
        if !frame.is(MESSAGE) {
            tracing::trace!(%frame, "Ignoring frame");
            return Ok(());
        }

        let topic = frame.get("destination").unwrap_or_default().to_string();
        match serde_json::from_str::<OrderNotification>(&frame.body) {
            Ok(notification) => {
                tracing::debug!(
                    topic = %topic,
                    kind = %notification.kind,
                    order_id = notification.order_id,
                    "Realtime notification"
                );
                // No receivers is fine
                let _ = self.events.send(RealtimeEvent::Notification {
                    topic,
                    notification,
                });
            }
            Err(e) => {
                tracing::warn!(topic = %topic, "Dropping undecodable notification: {e}");
            }
        }
        Ok(())
    }

    async fn teardown(&self, transport: &mut dyn StompTransport) {
        let goodbye = async {
            for index in 0..self.topics.len() {
                if transport
                    .send(StompFrame::unsubscribe(&subscription_id(index)))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = transport.send(StompFrame::disconnect()).await;
            let _ = transport.close().await;
        };
        if tokio::time::timeout(TEARDOWN_TIMEOUT, goodbye).await.is_err() {
            tracing::debug!("Realtime teardown timed out");
        }
    }
}

fn subscription_id(index: usize) -> String {
    format!("sub-{index}")
}

fn broker_error(frame: &StompFrame) -> RealtimeError {
    let message = frame
        .get("message")
        .map(str::to_string)
        .unwrap_or_else(|| frame.body.clone());
    RealtimeError::Broker(message)
}

/// Value of the STOMP `host` header
fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string())
}

/// Owner side of a running [`RealtimeChannel`]. Dropping it stops the
/// channel.
pub struct RealtimeHandle {
    events: broadcast::Sender<RealtimeEvent>,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RealtimeHandle {
    /// Admin feed of a department
    pub fn department(
        config: &ClientConfig,
        connector: Arc<dyn Connector>,
        dept: &str,
    ) -> Self {
        RealtimeChannel::spawn(
            config.realtime.clone(),
            connector,
            config.websocket_endpoint(),
            vec![topic::department_orders(dept)],
        )
    }

    /// Kitchen display: order feed plus kitchen actions
    pub fn kitchen(config: &ClientConfig, connector: Arc<dyn Connector>, dept: &str) -> Self {
        RealtimeChannel::spawn(
            config.realtime.clone(),
            connector,
            config.websocket_endpoint(),
            vec![topic::department_orders(dept), topic::department_kitchen(dept)],
        )
    }

    /// Per-order feed for a customer waiting on payment
    pub fn order(config: &ClientConfig, connector: Arc<dyn Connector>, order_id: i64) -> Self {
        RealtimeChannel::spawn(
            config.realtime.clone(),
            connector,
            config.websocket_endpoint(),
            vec![topic::order(order_id)],
        )
    }

    /// New subscriber; sees events published from now on
    pub fn events(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.status.borrow().is_live()
    }

    /// Stop the channel and wait for it to unsubscribe and disconnect
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Realtime task ended abnormally: {e}");
        }
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
