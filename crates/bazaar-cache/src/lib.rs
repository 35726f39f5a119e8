//! Type-safe key-value caching layer for the Bazaar storefront.
//!
//! Provides a small API for caching JSON-serialized data either in process
//! memory or in a SQLite table, plus a versioned per-visitor [`Session`]
//! store built on top of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_cache::Cache;
//!
//! let cache = Cache::in_memory();
//!
//! cache.set("cart:abc", &cart)?;
//! let cart: Option<Cart> = cache.get("cart:abc")?;
//! cache.delete("cart:abc")?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionId};
}
