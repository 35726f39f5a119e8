//! Order types.

use crate::cart::{shipping_fee, CartSummary};
use crate::checkout::{CustomerInfo, OrderReference};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId};
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// Stored as free text; orders are only ever created as
/// [`OrderStatus::pending`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub const PENDING: &'static str = "pending";

    pub fn pending() -> Self {
        Self(Self::PENDING.to_string())
    }

    pub fn from_stored(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of an order about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// An order built from a cart, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub reference: OrderReference,
    pub customer: CustomerInfo,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build a pending order with one item per summarized cart line.
    pub fn from_summary(customer: CustomerInfo, summary: &CartSummary) -> Self {
        Self {
            reference: OrderReference::generate(),
            customer,
            status: OrderStatus::pending(),
            placed_at: Utc::now(),
            items: summary
                .lines
                .iter()
                .map(|line| NewOrderItem {
                    product_id: line.id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// A stored order header.
///
/// Region, country and payment type are kept as the text that was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: OrderReference,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub status: OrderStatus,
    pub payment_type: String,
    pub placed_at: DateTime<Utc>,
}

/// An order item joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub item_id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub total: Money,
}

/// Aggregates over an order's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    /// Sum of line totals plus shipping.
    pub order_total: Money,
    pub quantity_total: i64,
}

impl OrderTotals {
    /// Total `(quantity, unit price)` pairs, starting from zero and adding
    /// shipping once. An order without items totals to shipping alone.
    pub fn compute<I>(lines: I, currency: Currency) -> Result<Self, CommerceError>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut order_total = shipping_fee(currency);
        let mut quantity_total: i64 = 0;
        for (quantity, unit_price) in lines {
            let line_total = Money::new(unit_price, currency)
                .try_multiply(quantity)
                .ok_or(CommerceError::Overflow)?;
            order_total = order_total
                .try_add(&line_total)
                .ok_or(CommerceError::Overflow)?;
            quantity_total = quantity_total
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
        }
        Ok(Self {
            order_total,
            quantity_total,
        })
    }
}

/// Dashboard row: an order header with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// Full order view for the admin order page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    #[serde(flatten)]
    pub totals: OrderTotals,
}
