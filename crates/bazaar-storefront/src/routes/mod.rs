//! HTTP routes.

mod admin;
mod shop;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::session::session_layer;
use crate::state::AppState;
use crate::telemetry::request_tracing;

/// Largest accepted request body; bounds product image uploads.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(state.images.dir());
    let images_path = state.images.url_prefix().to_string();

    Router::new()
        .route("/", get(shop::index))
        .route("/product/{id}", get(shop::product))
        .route("/cart", get(shop::cart))
        .route("/add-to-cart", post(shop::add_to_cart))
        .route("/quick-add/{id}", get(shop::quick_add))
        .route("/remove-from-cart/{index}", get(shop::remove_from_cart))
        .route("/checkout", get(shop::checkout_form).post(shop::place_order))
        .route("/admin", get(admin::dashboard))
        .route("/admin/add", get(admin::add_form).post(admin::add_product))
        .route("/admin/order/{id}", get(admin::order))
        .nest_service(&images_path, images)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(middleware::from_fn(request_tracing))
        .with_state(state)
}
