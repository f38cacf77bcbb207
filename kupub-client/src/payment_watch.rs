//! Waiting-screen payment polling

use std::time::Duration;

use async_trait::async_trait;
use shared::models::{Order, PaymentStatus};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ClientResult;
use crate::api::PublicApi;
use crate::config::MIN_POLL_INTERVAL;
use crate::http::HttpClient;
use crate::realtime::RealtimeEvent;

#[async_trait]
pub trait OrderLookup: Send + Sync {
    async fn lookup_order(&self, order_id: i64) -> ClientResult<Order>;
}

#[async_trait]
impl<C: HttpClient> OrderLookup for PublicApi<C> {
    async fn lookup_order(&self, order_id: i64) -> ClientResult<Order> {
        self.get_order(order_id).await
    }
}

/// How a payment wait ended
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Confirmed(Order),
    Failed(Order),
    Cancelled,
}

/// Polls an order until its payment settles
pub struct PaymentWatcher<L> {
    lookup: L,
    interval: Duration,
}

impl<L: OrderLookup> PaymentWatcher<L> {
    /// `interval` is clamped to [`MIN_POLL_INTERVAL`]
    pub fn new(lookup: L, interval: Duration) -> Self {
        Self {
            lookup,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Check now, then every interval, until the payment is confirmed or
    /// failed or `cancel` fires. Lookup errors are logged and polling
    /// continues. Notifications about `order_id` on `events` trigger an
    /// immediate check.
    pub async fn wait_confirmed(
        &self,
        order_id: i64,
        mut events: Option<broadcast::Receiver<RealtimeEvent>>,
        cancel: &CancellationToken,
    ) -> PaymentOutcome {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return PaymentOutcome::Cancelled,
                _ = ticker.tick() => {}
                event = next_event(&mut events) => match event {
                    Ok(event) if event.notification().order_id == order_id => {
                        tracing::debug!(order_id, kind = %event.notification().kind, "Payment notification");
                        ticker.reset();
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => ticker.reset(),
                    Err(RecvError::Closed) => {
                        events = None;
                        continue;
                    }
                },
            }

            let lookup = tokio::select! {
                _ = cancel.cancelled() => return PaymentOutcome::Cancelled,
                result = self.lookup.lookup_order(order_id) => result,
            };

            match lookup {
                Ok(order) => match order.payment_status {
                    PaymentStatus::Confirmed => {
                        tracing::info!(order_id, "Payment confirmed");
                        return PaymentOutcome::Confirmed(order);
                    }
                    PaymentStatus::Failed => {
                        tracing::warn!(order_id, "Payment failed");
                        return PaymentOutcome::Failed(order);
                    }
                    status => tracing::debug!(order_id, ?status, "Payment still pending"),
                },
                Err(e) => tracing::warn!(order_id, "Payment status check failed: {e}"),
            }
        }
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<RealtimeEvent>>,
) -> Result<RealtimeEvent, RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
