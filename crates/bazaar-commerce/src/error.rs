//! Commerce error types.

use crate::ids::{OrderId, ProductId};
use crate::validation::FieldErrors;
use thiserror::Error;

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Cart line index outside the current cart.
    #[error("Cart has no line at index {index} (cart has {len} lines)")]
    LineIndexOutOfRange { index: usize, len: usize },

    /// A submitted form failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The store rejected a write because of a UNIQUE or similar constraint.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Check if this error means the requested thing does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::LineIndexOutOfRange { .. }
        )
    }
}

#[cfg(feature = "storage")]
impl From<bazaar_db::DbError> for CommerceError {
    fn from(e: bazaar_db::DbError) -> Self {
        match e {
            bazaar_db::DbError::ConstraintViolation(msg) => CommerceError::ConstraintViolation(msg),
            other => CommerceError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
