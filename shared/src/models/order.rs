//! Order Model
//!
//! Orders are created from a cart submission. Monetary fields are computed
//! server-side and copied into the order; line items are snapshots of the
//! menu at creation time and never change afterwards.

use serde::{Deserialize, Serialize};

/// Kitchen fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Done,
    Cancelled,
}

/// Payment status, mutated independently of [`OrderStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
    NotRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub menu_id: Option<i64>,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default)]
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub session_id: i64,
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub table_code: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<i64>,
    #[serde(default)]
    pub subtotal: i64,
    #[serde(default)]
    pub table_fee: i64,
    #[serde(default)]
    pub corkage: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub total_price: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Order {
    /// Amount shown on the payment waiting screen.
    ///
    /// Only credits are applied from `discount`; a positive value is ignored.
    pub fn display_total(&self) -> i64 {
        let discount = self.discount.min(0);
        self.subtotal
            .saturating_add(self.table_fee)
            .saturating_add(discount)
            .max(0)
    }

    pub fn is_payment_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }

    pub fn is_payment_confirmed(&self) -> bool {
        self.payment_status == PaymentStatus::Confirmed
    }

    /// Whether the server charged the one-time table fee on this order
    pub fn charged_table_fee(&self) -> bool {
        self.table_fee > 0
    }

    /// `name xN` per line, comma-joined
    pub fn item_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One line of an order submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub quantity: u32,
}

impl OrderItemRequest {
    pub fn menu(menu_id: i64, quantity: u32) -> Self {
        Self {
            menu_id: Some(menu_id),
            name: None,
            price: None,
            quantity,
        }
    }
}

/// `POST /api/{dept}/orders` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub session_id: i64,
    /// Advisory: the server derives the fee it actually charges
    pub include_table_fee: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

/// `PATCH /api/{dept}/admin/orders/{id}` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderUpdateRequest {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn payment(payment_status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(payment_status),
            ..Default::default()
        }
    }
}

/// `POST /api/{dept}/admin/orders/{id}/send-receipt` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub phone_number: String,
}
