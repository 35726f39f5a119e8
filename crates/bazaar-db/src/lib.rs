//! Type-safe SQLite database layer for the Bazaar storefront.
//!
//! Wraps a single `rusqlite` connection with a small API that binds
//! [`Value`] parameters and deserializes rows into any `serde` type by
//! column name.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_db::{params, Db, Executor};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Product {
//!     id: i64,
//!     name: String,
//!     price: i64,
//! }
//!
//! let db = Db::open("bazaar.db")?;
//!
//! db.insert(
//!     "INSERT INTO product (name, price) VALUES (?, ?)",
//!     params!["Rust Book", 4999],
//! )?;
//!
//! let products: Vec<Product> = db.query_as(
//!     "SELECT id, name, price FROM product WHERE price < ?",
//!     params![10_000],
//! )?;
//! ```

mod db;
mod error;
mod types;

pub use db::{Db, Executor, Tx};
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, Executor, QueryResult, Row, Tx, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use bazaar_db::params;
///
/// let params = params!["Lagan", 42, None::<i64>];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
