//! Checkout: turning a cart into an order.

use crate::cart::{Cart, CartSummary};
use crate::catalog::ProductLookup;
use crate::checkout::{CheckoutChoices, CheckoutForm, NewOrder, OrderReference};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::money::{Currency, Money};
use crate::validation::FieldErrors;
use serde::Serialize;

/// Persists a new order.
///
/// Implementations must write the order, its items and the matching stock
/// decrements atomically.
pub trait OrderWriter {
    fn record_order(&self, order: &NewOrder) -> Result<OrderId, CommerceError>;
}

/// A checkout that has not produced an order yet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckoutDraft {
    pub summary: CartSummary,
    /// Empty until a submission fails validation.
    pub errors: FieldErrors,
    pub choices: CheckoutChoices,
}

impl CheckoutDraft {
    pub fn new(summary: CartSummary) -> Self {
        Self {
            summary,
            errors: FieldErrors::new(),
            choices: CheckoutChoices::default(),
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }
}

/// Receipt for a stored order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub reference: OrderReference,
    pub order_total: Money,
    pub item_count: usize,
}

/// Outcome of a checkout submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Draft(CheckoutDraft),
    Placed(PlacedOrder),
}

/// Load the draft view for a cart.
pub fn begin_checkout<L>(cart: &Cart, catalog: &L, currency: Currency) -> Result<CheckoutDraft, CommerceError>
where
    L: ProductLookup + ?Sized,
{
    Ok(CheckoutDraft::new(cart.summarize(catalog, currency)?))
}

/// Validate the form, write the order and clear the cart.
///
/// A form that fails validation yields [`CheckoutState::Draft`] with the
/// field errors; nothing is written and the cart is untouched. The cart is
/// only cleared after the writer has committed.
pub fn place_order<L, W>(
    cart: &mut Cart,
    form: &CheckoutForm,
    catalog: &L,
    writer: &W,
    currency: Currency,
) -> Result<CheckoutState, CommerceError>
where
    L: ProductLookup + ?Sized,
    W: OrderWriter + ?Sized,
{
    let summary = cart.summarize(catalog, currency)?;

    let customer = match form.validate() {
        Ok(customer) => customer,
        Err(errors) => {
            tracing::debug!(fields = %errors, "checkout form rejected");
            return Ok(CheckoutState::Draft(
                CheckoutDraft::new(summary).with_errors(errors),
            ));
        }
    };

    let order = NewOrder::from_summary(customer, &summary);
    let id = writer.record_order(&order)?;
    cart.clear();

    tracing::info!(
        order_id = %id,
        reference = %order.reference,
        items = order.items.len(),
        "order placed"
    );

    Ok(CheckoutState::Placed(PlacedOrder {
        id,
        reference: order.reference,
        order_total: summary.grand_total_plus_shipping,
        item_count: order.items.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::ids::ProductId;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingWriter {
        orders: RefCell<Vec<NewOrder>>,
        fail: bool,
    }

    impl OrderWriter for RecordingWriter {
        fn record_order(&self, order: &NewOrder) -> Result<OrderId, CommerceError> {
            if self.fail {
                return Err(CommerceError::DatabaseError("disk full".to_string()));
            }
            let mut orders = self.orders.borrow_mut();
            orders.push(order.clone());
            Ok(OrderId::new(orders.len() as i64))
        }
    }

    fn catalog() -> Vec<Product> {
        [(1, "A", 500), (2, "B", 1000)]
            .into_iter()
            .map(|(id, name, price)| Product {
                id: ProductId::new(id),
                name: name.to_string(),
                price,
                stock: 5,
                description: String::new(),
                image: String::new(),
            })
            .collect()
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Malika".to_string(),
            last_name: "Yusupova".to_string(),
            phone_number: "998901112233".to_string(),
            email: "malika@example.uz".to_string(),
            address: "Registon 5".to_string(),
            city: "Samarqand".to_string(),
            region: "Samarqand".to_string(),
            country: "UZ".to_string(),
            payment_type: "PayByCheck".to_string(),
        }
    }

    #[test]
    fn test_place_order_clears_cart() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 2);
        cart.add(ProductId::new(2), 1);
        let writer = RecordingWriter::default();

        let state = place_order(&mut cart, &form(), &catalog(), &writer, Currency::UZS).unwrap();

        let CheckoutState::Placed(placed) = state else {
            panic!("expected a placed order");
        };
        assert!(cart.is_empty());
        assert_eq!(placed.order_total.amount, 3000);
        assert!(placed.reference.is_well_formed());

        let orders = writer.orders.borrow();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].status.is_pending());
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[0].items[0].quantity, 2);
    }

    #[test]
    fn test_invalid_form_returns_draft() {
        let mut cart = Cart::new();
        cart.quick_add(ProductId::new(1));
        let writer = RecordingWriter::default();
        let mut bad = form();
        bad.email.clear();

        let state = place_order(&mut cart, &bad, &catalog(), &writer, Currency::UZS).unwrap();

        let CheckoutState::Draft(draft) = state else {
            panic!("expected a draft");
        };
        assert!(draft.errors.contains("email"));
        assert_eq!(draft.summary.grand_total.amount, 500);
        assert_eq!(cart.len(), 1);
        assert!(writer.orders.borrow().is_empty());
    }

    #[test]
    fn test_empty_cart_places_shipping_only_order() {
        let mut cart = Cart::new();
        let writer = RecordingWriter::default();

        let state = place_order(&mut cart, &form(), &catalog(), &writer, Currency::UZS).unwrap();

        let CheckoutState::Placed(placed) = state else {
            panic!("expected a placed order");
        };
        assert_eq!(placed.item_count, 0);
        assert_eq!(placed.order_total.amount, 1000);
    }

    #[test]
    fn test_writer_failure_keeps_cart() {
        let mut cart = Cart::new();
        cart.quick_add(ProductId::new(2));
        let writer = RecordingWriter {
            fail: true,
            ..Default::default()
        };

        let result = place_order(&mut cart, &form(), &catalog(), &writer, Currency::UZS);
        assert!(result.is_err());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let draft = begin_checkout(&Cart::new(), &catalog(), Currency::UZS).unwrap();
        let json = serde_json::to_value(CheckoutState::Draft(draft)).unwrap();
        assert_eq!(json["state"], "draft");
        assert_eq!(json["summary"]["grand_total_plus_shipping"]["amount"], 1000);
        assert_eq!(json["choices"]["regions"].as_array().unwrap().len(), 13);
    }
}
