//! Bazaar storefront HTTP application.
//!
//! An axum router over the commerce stores:
//! - catalog listing and product detail
//! - a cookie-keyed session cart
//! - checkout into the order ledger
//! - an admin panel for adding products and reading orders
//!
//! Pages answer with JSON; form posts redirect with `303 See Other`.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod uploads;

pub use config::StorefrontConfig;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;

/// Build state and router from a configuration.
pub async fn app(config: &StorefrontConfig) -> anyhow::Result<axum::Router> {
    let state = AppState::from_config(config).await?;
    Ok(build_router(state))
}
