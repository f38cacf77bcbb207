//! Customer cart
//!
//! The cart is client-only state, one per department. Mutations go through
//! [`CartAction`] and the pure [`reduce`]; [`CartStore`] persists the result
//! and owns the per-session "table fee already charged" flag.

mod pricing;
mod store;

pub use pricing::{CartSummary, price_cart};
pub use store::CartStore;

use serde::{Deserialize, Serialize};
use shared::models::{MenuItem, OrderItemRequest};

/// One cart line; the unit price is a snapshot of the menu at add time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }

    pub fn to_request(&self) -> OrderItemRequest {
        OrderItemRequest::menu(self.menu_id, self.quantity)
    }
}

/// Persisted cart (`kupub_cart_{dept}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub dept: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Cart {
    pub fn empty(dept: impl Into<String>) -> Self {
        Self {
            dept: dept.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn quantity_of(&self, menu_id: i64) -> u32 {
        self.items
            .iter()
            .find(|i| i.menu_id == menu_id)
            .map_or(0, |i| i.quantity)
    }
}

/// Cart mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit; an existing line for the same menu is incremented
    AddItem {
        menu_id: i64,
        name: String,
        price: i64,
        image_url: Option<String>,
    },
    RemoveItem(i64),
    /// Set the quantity of a line; zero or less removes it
    UpdateQuantity { menu_id: i64, quantity: i64 },
    /// Drop lines, discount code and note; the session is kept
    Clear,
    SetSession(i64),
    SetDiscountCode(Option<String>),
    SetNote(Option<String>),
}

impl CartAction {
    pub fn add(menu: &MenuItem) -> Self {
        CartAction::AddItem {
            menu_id: menu.id,
            name: menu.name.clone(),
            price: menu.price,
            image_url: menu.image_url.clone(),
        }
    }
}

/// Apply `action` to `cart`
pub fn reduce(mut cart: Cart, action: CartAction) -> Cart {
    match action {
        CartAction::AddItem {
            menu_id,
            name,
            price,
            image_url,
        } => match cart.items.iter_mut().find(|i| i.menu_id == menu_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => cart.items.push(CartItem {
                menu_id,
                name,
                price,
                quantity: 1,
                image_url,
            }),
        },
        CartAction::RemoveItem(menu_id) => cart.items.retain(|i| i.menu_id != menu_id),
        CartAction::UpdateQuantity { menu_id, quantity } => {
            if quantity <= 0 {
                cart.items.retain(|i| i.menu_id != menu_id);
            } else if let Some(line) = cart.items.iter_mut().find(|i| i.menu_id == menu_id) {
                line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }
        CartAction::Clear => {
            cart.items.clear();
            cart.discount_code = None;
            cart.note = None;
        }
        CartAction::SetSession(id) => cart.session_id = Some(id),
        CartAction::SetDiscountCode(code) => cart.discount_code = code.filter(|c| !c.is_empty()),
        CartAction::SetNote(note) => cart.note = note,
    }
    cart
}
