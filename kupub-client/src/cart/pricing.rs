//! Cart price derivation
//!
//! Pure projection of cart lines plus department pricing into the totals the
//! cart screen shows. Amounts are whole won; all sums saturate.

use shared::models::PricingSettings;

use super::CartItem;

/// Derived cart totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Units across all lines
    pub item_count: u32,
    /// Σ price × quantity
    pub subtotal: i64,
    /// Configured table fee, whether or not it is charged
    pub table_fee: i64,
    /// Whether `table_fee` is part of `total`
    pub include_table_fee: bool,
    /// Applied discount, zero or negative
    pub discount: i64,
    pub total: i64,
}

/// Compute the cart totals.
///
/// The table fee is included when it is positive and has not been charged
/// to this session yet. At most one discount applies: the first rule whose
/// `condition` equals `discount_code`. The total never goes below zero.
pub fn price_cart(
    items: &[CartItem],
    pricing: &PricingSettings,
    fees_already_paid: bool,
    discount_code: Option<&str>,
) -> CartSummary {
    let item_count = items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.quantity));
    let subtotal = items
        .iter()
        .fold(0i64, |acc, item| acc.saturating_add(item.line_total()));

    let table_fee = pricing.table_fee;
    let include_table_fee = table_fee > 0 && !fees_already_paid;

    let discount = discount_code
        .and_then(|code| pricing.find_discount(code))
        .map_or(0, |d| d.amount);

    let fee = if include_table_fee { table_fee } else { 0 };
    let total = subtotal.saturating_add(fee).saturating_add(discount).max(0);

    CartSummary {
        item_count,
        subtotal,
        table_fee,
        include_table_fee,
        discount,
        total,
    }
}
