use crate::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line in the shopper's cart.
///
/// Carries the display attributes the storefront needs alongside the
/// quantity, so a persisted cart can be rendered without a catalog lookup.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: u64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub stock_limit: u32,
}

impl CartItem {
    /// A cart line for one unit of a product.
    pub fn new(id: u64, name: impl Into<String>, unit_price: Decimal, stock_limit: u32) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity: 1,
            stock_limit,
        }
    }

    /// Same line with a different quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An immutable read of the cart at a point in time.
///
/// `subtotal` and `item_count` are pure functions of `items`, recomputed on
/// every snapshot and never mutated independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub item_count: u64,
}

impl CartSnapshot {
    pub fn of(items: &[CartItem]) -> Self {
        let subtotal = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();
        Self {
            items: items.to_vec(),
            subtotal,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal in integer minor units, as sent to the backend.
    pub fn subtotal_minor(&self) -> i64 {
        money::to_minor_units(self.subtotal)
    }

    /// Display total after a discount, clamped so it never goes negative.
    pub fn total_after_discount(&self, discount: Decimal) -> Decimal {
        money::payable_total(self.subtotal, discount)
    }
}
