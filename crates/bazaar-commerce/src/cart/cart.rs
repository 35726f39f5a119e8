//! Session cart and its lines.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::validation::FieldErrors;
use serde::{Deserialize, Serialize};

/// One (product, quantity) pair in a cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A visitor's shopping cart.
///
/// Lines keep insertion order and are addressed by position. Adding the same
/// product twice produces two lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    ///
    /// Neither the product id nor the quantity is checked here; an unknown
    /// product surfaces when the cart is summarized.
    pub fn add(&mut self, product_id: ProductId, quantity: i64) {
        self.lines.push(CartLine {
            product_id,
            quantity,
        });
    }

    /// Append a line with quantity 1.
    pub fn quick_add(&mut self, product_id: ProductId) {
        self.add(product_id, 1);
    }

    /// Remove the line at `index`, shifting later lines down.
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CommerceError> {
        if index >= self.lines.len() {
            return Err(CommerceError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop the first occurrence of each line in `checked_out`.
    ///
    /// Lines added after the checkout snapshot was taken stay in the cart.
    pub fn remove_checked_out(&mut self, checked_out: &[CartLine]) {
        for line in checked_out {
            if let Some(pos) = self.lines.iter().position(|l| l == line) {
                self.lines.remove(pos);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}

/// Raw add-to-cart form: a hidden product id and a quantity box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddToCartForm {
    pub id: String,
    pub quantity: String,
}

impl AddToCartForm {
    /// Both fields must be integers. The quantity is not range-checked.
    pub fn validate(&self) -> Result<CartLine, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = errors.integer("id", &self.id);
        let quantity = errors.integer("quantity", &self.quantity);
        match (product_id, quantity) {
            (Some(id), Some(quantity)) => Ok(CartLine {
                product_id: ProductId::new(id),
                quantity,
            }),
            _ => Err(errors),
        }
    }
}
