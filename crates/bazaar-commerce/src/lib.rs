//! E-commerce domain types and logic for the Bazaar storefront.
//!
//! - **Catalog**: products and the add-product form
//! - **Cart**: the per-session cart and its priced summary
//! - **Checkout**: customer form, order references, orders and the flow
//!   that turns a cart into an order
//! - **Store** (feature `storage`): SQLite-backed catalog and order ledger
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! cart.add(ProductId::new(1), 2);
//! cart.quick_add(ProductId::new(2));
//!
//! let summary = cart.summarize(&catalog, Currency::UZS)?;
//! println!("Total: {}", summary.grand_total_plus_shipping.display());
//!
//! match place_order(&mut cart, &form, &catalog, &ledger, Currency::UZS)? {
//!     CheckoutState::Placed(order) => println!("placed {}", order.reference),
//!     CheckoutState::Draft(draft) => println!("fix: {}", draft.errors),
//! }
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod validation;

pub mod cart;
pub mod catalog;
pub mod checkout;

#[cfg(feature = "storage")]
pub mod store;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use validation::FieldErrors;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::validation::FieldErrors;

    // Catalog
    pub use crate::catalog::{NewProduct, NewProductForm, Product, ProductDraft, ProductLookup};

    // Cart
    pub use crate::cart::{
        AddToCartForm, Cart, CartLine, CartSummary, SummaryLine, SHIPPING_FLAT_RATE,
    };

    // Checkout
    pub use crate::checkout::{
        begin_checkout, place_order, CheckoutDraft, CheckoutForm, CheckoutState, CustomerInfo,
        Order, OrderDetail, OrderReference, OrderStatus, OrderSummary, OrderWriter, PlacedOrder,
    };

    // Store
    #[cfg(feature = "storage")]
    pub use crate::store::{ensure_schema, CatalogStore, OrderLedger};
}
