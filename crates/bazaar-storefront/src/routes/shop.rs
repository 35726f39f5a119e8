//! Visitor-facing routes: catalog, cart and checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use bazaar_cache::{CacheError, Session, SessionId};
use bazaar_commerce::cart::{AddToCartForm, Cart, CartLine, CartSummary};
use bazaar_commerce::catalog::Product;
use bazaar_commerce::checkout::{self, CheckoutForm, CheckoutState};
use bazaar_commerce::ProductId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(super) async fn index(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog.list()?))
}

pub(super) async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_product_id(&id)?;
    let product = state
        .catalog
        .get(id)?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

pub(super) async fn cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Json<CartSummary>> {
    let cart = state.carts.get_or_default(&session)?;
    Ok(Json(cart.summarize(&state.catalog, state.currency)?))
}

/// An invalid form is dropped silently; the visitor lands back on the
/// catalog either way.
pub(super) async fn add_to_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<AddToCartForm>,
) -> ApiResult<Redirect> {
    match form.validate() {
        Ok(line) => {
            let (cart, ()) = state
                .carts
                .update(&session, |cart| cart.add(line.product_id, line.quantity))?;
            tracing::debug!(
                product_id = %line.product_id,
                quantity = line.quantity,
                lines = cart.len(),
                "added to cart"
            );
        }
        Err(errors) => tracing::debug!(%errors, "add-to-cart form rejected"),
    }
    Ok(Redirect::to("/"))
}

pub(super) async fn quick_add(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> ApiResult<Redirect> {
    let id = parse_product_id(&id)?;
    state.carts.update(&session, |cart| cart.quick_add(id))?;
    Ok(Redirect::to("/"))
}

pub(super) async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(index): Path<String>,
) -> ApiResult<Redirect> {
    let index: usize = index
        .parse()
        .map_err(|_| ApiError::not_found(format!("No cart line at index {index}")))?;

    // Bounds check on a copy so a bad index never writes the session.
    state.carts.get_or_default(&session)?.remove(index)?;

    let (_, removed) = state.carts.update(&session, |cart| cart.remove(index))?;
    removed?;
    Ok(Redirect::to("/cart"))
}

pub(super) async fn checkout_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Json<CheckoutState>> {
    let cart = state.carts.get_or_default(&session)?;
    let draft = checkout::begin_checkout(&cart, &state.catalog, state.currency)?;
    Ok(Json(CheckoutState::Draft(draft)))
}

/// Redirects home once the order is stored; a rejected form comes back as
/// 422 with the draft and its field errors.
///
/// Only the lines that went into the order leave the session cart, so a
/// line added from another tab during checkout survives.
pub(super) async fn place_order(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<CheckoutForm>,
) -> ApiResult<Response> {
    let snapshot = state.carts.get_or_default(&session)?;
    let mut cart = snapshot.clone();

    match checkout::place_order(&mut cart, &form, &state.catalog, &state.ledger, state.currency)? {
        CheckoutState::Placed(_) => {
            settle_cart(&state.carts, &session, snapshot.lines())?;
            Ok(Redirect::to("/").into_response())
        }
        draft @ CheckoutState::Draft(_) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(draft)).into_response())
        }
    }
}

fn settle_cart(
    carts: &Session<Cart>,
    session: &SessionId,
    checked_out: &[CartLine],
) -> Result<Cart, CacheError> {
    let (cart, ()) = carts.update(session, |cart| cart.remove_checked_out(checked_out))?;
    Ok(cart)
}

fn parse_product_id(raw: &str) -> ApiResult<ProductId> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Product not found: {raw}")))
}
