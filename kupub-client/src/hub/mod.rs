//! Service hub projections
//!
//! Pure functions over the admin snapshot (sessions, orders, tables):
//! grouping orders under their session, stage classification, free-text
//! search, dashboard counters, table availability and the kitchen queue.
//! Nothing here is authoritative; the backend owns every entity.

mod search;
mod stage;

pub use search::{SearchQuery, StagedSession, classify_and_filter};
pub use stage::{Stage, StageFilter, determine_stage};

use chrono::{DateTime, NaiveDateTime};
use shared::models::{Order, OrderStatus, PaymentStatus, Session, Table};
use std::collections::{HashMap, HashSet};

/// A session with its orders, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWithOrders {
    pub session: Session,
    pub orders: Vec<Order>,
}

/// Attach every order to its session.
///
/// Orders are sorted newest first by `created_at`; orders whose session is
/// not in `sessions` are dropped.
pub fn group_orders(sessions: &[Session], orders: &[Order]) -> Vec<SessionWithOrders> {
    let mut by_session: HashMap<i64, Vec<Order>> = HashMap::new();
    for order in orders {
        by_session
            .entry(order.session_id)
            .or_default()
            .push(order.clone());
    }

    sessions
        .iter()
        .map(|session| {
            let mut orders = by_session.remove(&session.id).unwrap_or_default();
            // Unparsable timestamps sort last
            orders.sort_by(|a, b| {
                parse_timestamp(&b.created_at).cmp(&parse_timestamp(&a.created_at))
            });
            SessionWithOrders {
                session: session.clone(),
                orders,
            }
        })
        .collect()
}

/// Backend timestamps come with or without an offset
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Guests of active sessions that have a table
    pub seated_people: u32,
    /// Tables not held by an active session
    pub empty_tables: usize,
    /// Active sessions still waiting for a table
    pub waiting_sessions: usize,
    /// Sessions with at least one order awaiting payment
    pub unpaid_sessions: usize,
}

impl HubStats {
    pub fn compute(sessions: &[Session], orders: &[Order], tables: &[Table]) -> Self {
        let active = || sessions.iter().filter(|s| s.is_active());

        let seated_people = active()
            .filter(|s| s.has_table())
            .fold(0u32, |acc, s| acc.saturating_add(s.people));
        let occupied: HashSet<i64> = active().filter_map(|s| s.table_id).collect();
        let waiting_sessions = active().filter(|s| !s.has_table()).count();
        let unpaid_sessions = orders
            .iter()
            .filter(|o| o.payment_status == PaymentStatus::Pending)
            .map(|o| o.session_id)
            .collect::<HashSet<_>>()
            .len();

        Self {
            seated_people,
            empty_tables: tables.len().saturating_sub(occupied.len()),
            waiting_sessions,
            unpaid_sessions,
        }
    }
}

/// Tables that `session_id` may be assigned to: those not held by another
/// active session, plus the one it already has
pub fn available_tables<'a>(
    sessions: &[Session],
    tables: &'a [Table],
    session_id: i64,
    current_table_id: Option<i64>,
) -> Vec<&'a Table> {
    let occupied: HashSet<i64> = sessions
        .iter()
        .filter(|s| s.is_active() && s.id != session_id)
        .filter_map(|s| s.table_id)
        .collect();

    tables
        .iter()
        .filter(|t| !occupied.contains(&t.id) || Some(t.id) == current_table_id)
        .collect()
}

/// Orders the kitchen should work on: preparing, or pending with payment
/// already confirmed
pub fn kitchen_queue(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| match o.status {
            OrderStatus::Preparing => true,
            OrderStatus::Pending => o.payment_status == PaymentStatus::Confirmed,
            OrderStatus::Done | OrderStatus::Cancelled => false,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use shared::models::{
        Order, OrderItem, OrderStatus, PaymentStatus, Session, SessionStatus, SessionType, Table,
    };

    pub fn session(id: i64, table_id: Option<i64>) -> Session {
        Session {
            id,
            department_id: 1,
            session_type: SessionType::Code,
            reservation_id: None,
            table_id,
            table_code: table_id.map(|t| format!("A{t}")),
            session_code: Some(format!("CODE{id}")),
            guest_name: format!("guest{id}"),
            guest_phone: Some(format!("0101234000{id}")),
            people: 2,
            status: SessionStatus::Active,
            created_at: "2024-05-01T18:00:00".into(),
            closed_at: None,
        }
    }

    pub fn order(id: i64, session_id: i64, status: OrderStatus, payment: PaymentStatus) -> Order {
        Order {
            id,
            department_id: Some(1),
            session_id,
            table_id: None,
            table_code: None,
            reservation_id: None,
            subtotal: 5000,
            table_fee: 0,
            corkage: 0,
            discount: 0,
            total_price: 5000,
            status,
            payment_status: payment,
            note: None,
            items: vec![OrderItem {
                id: None,
                menu_id: Some(1),
                name: "Tteokbokki".into(),
                price: 5000,
                quantity: 1,
                subtotal: 5000,
            }],
            created_at: format!("2024-05-01T19:{:02}:00", id % 60),
            updated_at: None,
        }
    }

    pub fn table(id: i64) -> Table {
        Table {
            id,
            department_id: Some(1),
            code: format!("A{id}"),
            name: format!("Table {id}"),
            capacity: 4,
            pos_x: 0,
            pos_y: 0,
            width: 100,
            height: 100,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{order, session, table};
    use super::*;
    use shared::models::SessionStatus;

    #[test]
    fn test_group_orders_newest_first() {
        let sessions = [session(1, None), session(2, None)];
        let orders = [
            order(10, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(30, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(20, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(40, 9, OrderStatus::Pending, PaymentStatus::Pending),
        ];
        let grouped = group_orders(&sessions, &orders);
        assert_eq!(grouped.len(), 2);
        let ids: Vec<i64> = grouped[0].orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, [30, 20, 10]);
        assert!(grouped[1].orders.is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T19:00:00").is_some());
        assert!(parse_timestamp("2024-05-01T19:00:00.123").is_some());
        assert!(parse_timestamp("2024-05-01T19:00:00+09:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_stats() {
        let mut closed = session(3, Some(3));
        closed.status = SessionStatus::Closed;
        let sessions = [session(1, Some(1)), session(2, None), closed];
        let orders = [
            order(10, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(11, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(12, 2, OrderStatus::Pending, PaymentStatus::Confirmed),
        ];
        let tables = [table(1), table(2), table(3)];

        let stats = HubStats::compute(&sessions, &orders, &tables);
        assert_eq!(stats.seated_people, 2);
        assert_eq!(stats.empty_tables, 2);
        assert_eq!(stats.waiting_sessions, 1);
        assert_eq!(stats.unpaid_sessions, 1);
    }

    #[test]
    fn test_available_tables_keeps_current() {
        let sessions = [session(1, Some(1)), session(2, Some(2))];
        let tables = [table(1), table(2), table(3)];

        let ids = |v: Vec<&Table>| v.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(available_tables(&sessions, &tables, 2, Some(2))), [2, 3]);
        assert_eq!(ids(available_tables(&sessions, &tables, 5, None)), [3]);
    }

    #[test]
    fn test_kitchen_queue() {
        let orders = [
            order(1, 1, OrderStatus::Pending, PaymentStatus::Pending),
            order(2, 1, OrderStatus::Pending, PaymentStatus::Confirmed),
            order(3, 1, OrderStatus::Preparing, PaymentStatus::Pending),
            order(4, 1, OrderStatus::Done, PaymentStatus::Confirmed),
            order(5, 1, OrderStatus::Cancelled, PaymentStatus::Confirmed),
        ];
        let ids: Vec<i64> = kitchen_queue(&orders).iter().map(|o| o.id).collect();
        assert_eq!(ids, [2, 3]);
    }
}
