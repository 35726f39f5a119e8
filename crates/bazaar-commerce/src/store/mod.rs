//! SQLite persistence for the catalog and order ledger.
//!
//! Available with the `storage` feature.

mod catalog;
mod ledger;
mod schema;

pub use catalog::CatalogStore;
pub use ledger::OrderLedger;
pub use schema::{ensure_schema, SCHEMA};
