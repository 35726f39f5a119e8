//! Shopping cart module.
//!
//! Contains the session cart and its priced summary.

mod cart;
mod summary;

pub use cart::{AddToCartForm, Cart, CartLine};
pub use summary::{shipping_fee, CartSummary, SummaryLine, SHIPPING_FLAT_RATE};
