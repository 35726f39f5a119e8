//! Checkout module.
//!
//! Contains the checkout form, reference codes, orders and the flow that
//! turns a cart into an order.

mod customer;
mod flow;
mod order;
mod reference;

pub use customer::{
    CheckoutChoices, CheckoutForm, Choice, Country, CustomerInfo, PaymentType, Region,
};
pub use flow::{begin_checkout, place_order, CheckoutDraft, CheckoutState, OrderWriter, PlacedOrder};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderDetail, OrderLine, OrderStatus, OrderSummary,
    OrderTotals,
};
pub use reference::{OrderReference, REFERENCE_LEN};
