//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use bazaar_cache::{Cache, Session};
use bazaar_commerce::cart::Cart;
use bazaar_commerce::store::{ensure_schema, CatalogStore, OrderLedger};
use bazaar_commerce::Currency;
use bazaar_db::Db;

use crate::config::{SessionBackend, StorefrontConfig};
use crate::uploads::ImageStore;

/// Handles every request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub ledger: OrderLedger,
    pub carts: Session<Cart>,
    pub images: ImageStore,
    pub currency: Currency,
    cookie_name: Arc<str>,
}

impl AppState {
    /// Open the database, create missing tables and the upload directory.
    pub async fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let currency = config.currency()?;

        let db = Db::open(&config.database.path)
            .with_context(|| format!("Failed to open database: {}", config.database.path))?;
        ensure_schema(&db).context("Failed to create schema")?;

        let cache = match config.session.backend {
            SessionBackend::Memory => Cache::in_memory(),
            SessionBackend::Sqlite => {
                Cache::sqlite(db.clone()).context("Failed to open session store")?
            }
        };

        let images = ImageStore::new(&config.uploads.dir, &config.uploads.url_prefix);
        images.ensure_dir().await.with_context(|| {
            format!(
                "Failed to create uploads directory: {}",
                config.uploads.dir.display()
            )
        })?;

        tracing::info!(
            database = %config.database.path,
            sessions = ?config.session.backend,
            currency = %currency,
            "storefront state ready"
        );

        Ok(Self {
            catalog: CatalogStore::new(db.clone()),
            ledger: OrderLedger::new(db, currency),
            carts: Session::new(cache),
            images,
            currency,
            cookie_name: Arc::from(config.session.cookie_name.as_str()),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}
