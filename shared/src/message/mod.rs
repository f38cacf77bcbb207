//! Realtime notification payloads
//!
//! The backend publishes JSON bodies on STOMP topics whenever an order is
//! created or changes state. Clients never merge these payloads into local
//! state; a notification only signals that a re-fetch is due.
//!
//! | topic                      | kinds                                        |
//! |----------------------------|----------------------------------------------|
//! | `/topic/{dept}/orders`     | `NEW_ORDER`, `ORDER_STATUS_CHANGED`          |
//! | `/topic/orders/{orderId}`  | `PAYMENT_CONFIRMED`                          |
//! | `/topic/{dept}/kitchen`    | kitchen actions (free-form `type`)           |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Notification `type` field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    NewOrder,
    OrderStatusChanged,
    PaymentConfirmed,
    /// Any other kind (e.g. kitchen actions), kept verbatim
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::NewOrder => "NEW_ORDER",
            NotificationKind::OrderStatusChanged => "ORDER_STATUS_CHANGED",
            NotificationKind::PaymentConfirmed => "PAYMENT_CONFIRMED",
            NotificationKind::Other(kind) => kind,
        }
    }

    /// Whether this kind invalidates the order/session/table snapshot
    pub fn triggers_refetch(&self) -> bool {
        !matches!(self, NotificationKind::Other(_))
    }
}

impl From<&str> for NotificationKind {
    fn from(value: &str) -> Self {
        match value {
            "NEW_ORDER" => NotificationKind::NewOrder,
            "ORDER_STATUS_CHANGED" => NotificationKind::OrderStatusChanged,
            "PAYMENT_CONFIRMED" => NotificationKind::PaymentConfirmed,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NotificationKind::from(raw.as_str()))
    }
}

/// Body of a realtime notification
///
/// `status` carries the order status on department topics and the payment
/// status on per-order topics, so it is kept as the raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub order_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl OrderNotification {
    pub fn new(kind: NotificationKind, order_id: i64) -> Self {
        Self {
            kind,
            order_id,
            total_price: None,
            status: None,
            payment_status: None,
            timestamp: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Topic destinations
pub mod topic {
    /// Admin order feed of a department
    pub fn department_orders(dept: &str) -> String {
        format!("/topic/{dept}/orders")
    }

    /// Kitchen display feed of a department
    pub fn department_kitchen(dept: &str) -> String {
        format!("/topic/{dept}/kitchen")
    }

    /// Per-order feed watched by the customer's waiting screen
    pub fn order(order_id: i64) -> String {
        format!("/topic/orders/{order_id}")
    }
}
