//! Past orders, as written to the order store by the payment webhook.
//!
//! Orders are read-only from the storefront's perspective.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::price::Price;

/// A completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Document key (the payment session ID).
    pub id: OrderId,
    /// Amount charged, shipping included.
    pub amount: Decimal,
    /// Shipping portion of `amount`.
    pub amount_shipping: Decimal,
    /// Image URLs of the purchased products, one per line item.
    pub images: Vec<String>,
    /// When the order was placed, in unix seconds.
    pub timestamp: i64,
}

impl Order {
    /// Total charged as a displayable price.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::inr(self.amount)
    }

    /// Shipping charge as a displayable price.
    #[must_use]
    pub const fn shipping(&self) -> Price {
        Price::inr(self.amount_shipping)
    }

    /// Number of purchased line items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.images.len()
    }

    /// Placement time, or `None` if the timestamp is out of range.
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Sort orders newest first. Equal timestamps keep their relative order.
    pub fn sort_newest_first(orders: &mut [Self]) {
        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}
