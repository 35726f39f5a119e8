//! Cart pricing against the catalog.

use crate::cart::Cart;
use crate::catalog::ProductLookup;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::Serialize;

/// Flat shipping surcharge, in minor units, added to every order.
pub const SHIPPING_FLAT_RATE: i64 = 1000;

/// The shipping surcharge in the given currency.
pub fn shipping_fee(currency: Currency) -> Money {
    Money::new(SHIPPING_FLAT_RATE, currency)
}

/// A priced cart line.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryLine {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: String,
    pub quantity: i64,
    pub total: Money,
    /// Position in the cart, used to remove the line.
    pub index: usize,
}

/// Priced view of a cart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<SummaryLine>,
    pub grand_total: Money,
    pub quantity_total: i64,
    pub grand_total_plus_shipping: Money,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Cart {
    /// Resolve every line against the catalog and total the cart.
    ///
    /// Fails with [`CommerceError::ProductNotFound`] if any line points at a
    /// product that no longer exists.
    pub fn summarize<L>(&self, catalog: &L, currency: Currency) -> Result<CartSummary, CommerceError>
    where
        L: ProductLookup + ?Sized,
    {
        let mut lines = Vec::with_capacity(self.len());
        let mut grand_total = Money::zero(currency);
        let mut quantity_total: i64 = 0;

        for (index, line) in self.lines().iter().enumerate() {
            let product = catalog.require_product(line.product_id)?;
            let price = product.unit_price(currency);
            let total = price
                .try_multiply(line.quantity)
                .ok_or(CommerceError::Overflow)?;

            grand_total = grand_total.try_add(&total).ok_or(CommerceError::Overflow)?;
            quantity_total = quantity_total
                .checked_add(line.quantity)
                .ok_or(CommerceError::Overflow)?;

            lines.push(SummaryLine {
                id: product.id,
                name: product.name,
                price,
                image: product.image,
                quantity: line.quantity,
                total,
                index,
            });
        }

        let grand_total_plus_shipping = grand_total
            .try_add(&shipping_fee(currency))
            .ok_or(CommerceError::Overflow)?;

        Ok(CartSummary {
            lines,
            grand_total,
            quantity_total,
            grand_total_plus_shipping,
        })
    }
}
