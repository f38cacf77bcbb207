//! Snapshot reconciliation for admin and kitchen views
//!
//! Eventually consistent via full re-fetch: every relevant notification
//! invalidates the whole snapshot, and a poll tick re-fetches it anyway
//! when notifications are missed. Notification payloads are never merged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::models::{Order, Session, Table};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::ClientResult;
use crate::api::AdminApi;
use crate::config::MIN_POLL_INTERVAL;
use crate::http::HttpClient;
use crate::hub::{HubStats, SessionWithOrders, group_orders, kitchen_queue};
use crate::realtime::RealtimeEvent;

/// Everything the service hub renders from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub sessions: Vec<Session>,
    pub orders: Vec<Order>,
    pub tables: Vec<Table>,
}

impl Snapshot {
    pub fn hub(&self) -> Vec<SessionWithOrders> {
        group_orders(&self.sessions, &self.orders)
    }

    pub fn stats(&self) -> HubStats {
        HubStats::compute(&self.sessions, &self.orders, &self.tables)
    }

    pub fn kitchen_queue(&self) -> Vec<&Order> {
        kitchen_queue(&self.orders)
    }
}

/// Where snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch_snapshot(&self) -> ClientResult<Snapshot>;
}

#[async_trait]
impl<C: HttpClient + 'static> SnapshotSource for AdminApi<C> {
    async fn fetch_snapshot(&self) -> ClientResult<Snapshot> {
        let (sessions, orders, tables) = tokio::try_join!(
            // Closed sessions too, so finished visits stay searchable
            self.list_sessions(true),
            self.list_orders(None),
            self.list_tables()
        )?;
        Ok(Snapshot {
            sessions,
            orders,
            tables,
        })
    }
}

/// Background re-fetch loop
pub struct Reconciler<S> {
    source: Arc<S>,
    events: Option<broadcast::Receiver<RealtimeEvent>>,
    poll_interval: Duration,
    snapshot: watch::Sender<Arc<Snapshot>>,
}

impl<S: SnapshotSource> Reconciler<S> {
    /// Start reconciling. The task ends once every receiver is dropped.
    ///
    /// `events` may be `None` when realtime is unavailable; the poll tick
    /// then carries all updates. `poll_interval` is clamped to
    /// [`MIN_POLL_INTERVAL`].
    pub fn spawn(
        source: Arc<S>,
        events: Option<broadcast::Receiver<RealtimeEvent>>,
        poll_interval: Duration,
    ) -> watch::Receiver<Arc<Snapshot>> {
        let (snapshot, rx) = watch::channel(Arc::new(Snapshot::default()));
        let reconciler = Reconciler {
            source,
            events,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            snapshot,
        };
        tokio::spawn(reconciler.run());
        rx
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut dirty = true;

        loop {
            if dirty {
                tokio::select! {
                    _ = self.snapshot.closed() => break,
                    _ = self.refresh() => {}
                }
                ticker.reset();
                // Everything that arrived during the fetch folds into one more
                dirty = self.drain_events();
                if dirty {
                    continue;
                }
            }

            tokio::select! {
                _ = self.snapshot.closed() => break,
                _ = ticker.tick() => {
                    tracing::trace!("Reconcile poll tick");
                    dirty = true;
                }
                event = next_event(&mut self.events) => match event {
                    Ok(event) => dirty = triggers_refetch(&event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "Reconciler lagged behind notifications");
                        dirty = true;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Notification stream closed; polling only");
                        self.events = None;
                    }
                },
            }
        }

        tracing::debug!("Reconciler stopped");
    }

    async fn refresh(&self) {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(
                    sessions = snapshot.sessions.len(),
                    orders = snapshot.orders.len(),
                    tables = snapshot.tables.len(),
                    "Snapshot refreshed"
                );
                self.snapshot.send_replace(Arc::new(snapshot));
            }
            Err(e) => {
                tracing::warn!("Snapshot refresh failed, keeping previous: {e}");
            }
        }
    }

    /// Consume queued events; true if any of them calls for a re-fetch
    fn drain_events(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };
        let mut dirty = false;
        loop {
            match events.try_recv() {
                Ok(event) => dirty |= triggers_refetch(&event),
                Err(TryRecvError::Lagged(_)) => dirty = true,
                Err(TryRecvError::Empty) => return dirty,
                Err(TryRecvError::Closed) => {
                    self.events = None;
                    return dirty;
                }
            }
        }
    }
}

fn triggers_refetch(event: &RealtimeEvent) -> bool {
    event.notification().kind.triggers_refetch()
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<RealtimeEvent>>,
) -> Result<RealtimeEvent, RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use crate::http::fake::FakeHttp;
    use crate::hub::Stage;
    use crate::hub::fixtures::{order, session, table};
    use shared::message::{NotificationKind, OrderNotification};
    use shared::models::{OrderStatus, PaymentStatus, SessionStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches; fails the calls listed in `fail_on` (1-based)
    struct CountingSource {
        calls: AtomicUsize,
        latency: Duration,
        fail_on: Vec<usize>,
    }

    impl CountingSource {
        fn new() -> Arc<Self> {
            Self::with(Duration::ZERO, vec![])
        }

        fn with(latency: Duration, fail_on: Vec<usize>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                latency,
                fail_on,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for CountingSource {
        async fn fetch_snapshot(&self) -> ClientResult<Snapshot> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.fail_on.contains(&call) {
                return Err(ClientError::EmptyResponse);
            }
            Ok(Snapshot {
                sessions: vec![session(call as i64, None)],
                orders: vec![order(1, call as i64, OrderStatus::Pending, PaymentStatus::Pending)],
                tables: vec![table(1)],
            })
        }
    }

    fn event(kind: NotificationKind) -> RealtimeEvent {
        RealtimeEvent::Notification {
            topic: "/topic/cs/orders".into(),
            notification: OrderNotification::new(kind, 1),
        }
    }

    const POLL: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately() {
        let source = CountingSource::new();
        let mut rx = Reconciler::spawn(source.clone(), None, POLL);

        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(rx.borrow().sessions[0].id, 1);
        assert_eq!(rx.borrow().stats().empty_tables, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_triggers_refetch() {
        let source = CountingSource::new();
        let (tx, events) = broadcast::channel(16);
        let mut rx = Reconciler::spawn(source.clone(), Some(events), POLL);
        rx.changed().await.unwrap();

        tx.send(event(NotificationKind::NewOrder)).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(rx.borrow().sessions[0].id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_kinds_are_ignored() {
        let source = CountingSource::new();
        let (tx, events) = broadcast::channel(16);
        let mut rx = Reconciler::spawn(source.clone(), Some(events), POLL);
        rx.changed().await.unwrap();

        tx.send(event(NotificationKind::Other("PREPARE".into()))).unwrap();
        tokio::time::sleep(POLL / 2).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tick_is_backstop() {
        let source = CountingSource::new();
        let mut rx = Reconciler::spawn(source.clone(), None, POLL);
        rx.changed().await.unwrap();

        let started = Instant::now();
        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(started.elapsed(), POLL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let source = CountingSource::with(Duration::ZERO, vec![2]);
        let (tx, events) = broadcast::channel(16);
        let mut rx = Reconciler::spawn(source.clone(), Some(events), POLL);
        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().clone();

        tx.send(event(NotificationKind::OrderStatusChanged)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 2);
        assert!(!rx.has_changed().unwrap());
        assert!(Arc::ptr_eq(&first, &rx.borrow()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bursts_are_coalesced() {
        let source = CountingSource::with(Duration::from_secs(1), vec![]);
        let (tx, events) = broadcast::channel(16);
        let _rx = Reconciler::spawn(source.clone(), Some(events), POLL);

        // Five notifications while the first fetch is in flight
        tokio::time::sleep(Duration::from_millis(100)).await;
        for _ in 0..5 {
            tx.send(event(NotificationKind::NewOrder)).unwrap();
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receivers_dropped() {
        let source = CountingSource::new();
        let mut rx = Reconciler::spawn(source.clone(), None, POLL);
        rx.changed().await.unwrap();
        drop(rx);

        tokio::time::sleep(POLL * 3).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_admin_snapshot_includes_closed_sessions() {
        let mut closed = session(2, Some(3));
        closed.status = SessionStatus::Closed;
        closed.closed_at = Some("2024-05-01T21:00:00".into());

        let http = FakeHttp::new();
        http.reply(
            "GET",
            "/api/cs/admin/sessions?all=true",
            serde_json::to_value([session(1, Some(1)), closed]).unwrap(),
        );
        http.reply(
            "GET",
            "/api/cs/admin/orders",
            serde_json::to_value([
                order(10, 1, OrderStatus::Preparing, PaymentStatus::Confirmed),
                order(11, 2, OrderStatus::Done, PaymentStatus::Confirmed),
            ])
            .unwrap(),
        );
        http.reply(
            "GET",
            "/api/cs/admin/tables",
            serde_json::to_value([table(1), table(3)]).unwrap(),
        );

        let snapshot = AdminApi::new(http.clone(), "cs").fetch_snapshot().await.unwrap();
        assert_eq!(http.count("GET", "/api/cs/admin/sessions?all=true"), 1);
        assert_eq!(http.count("GET", "/api/cs/admin/sessions"), 0);

        let stages: Vec<(i64, Stage)> = snapshot
            .hub()
            .iter()
            .map(|entry| (entry.session.id, entry.stage()))
            .collect();
        assert!(stages.contains(&(1, Stage::Active)));
        assert!(stages.contains(&(2, Stage::Done)));

        // The closed session no longer holds its table
        assert_eq!(snapshot.stats().empty_tables, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_is_clamped() {
        let source = CountingSource::new();
        let mut rx = Reconciler::spawn(source.clone(), None, Duration::ZERO);
        rx.changed().await.unwrap();

        let started = Instant::now();
        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(started.elapsed(), MIN_POLL_INTERVAL);
    }
}
