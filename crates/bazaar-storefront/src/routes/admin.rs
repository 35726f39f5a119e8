//! Admin routes: dashboard, product creation and order detail.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::response::Redirect;
use axum::Json;
use bazaar_commerce::catalog::{
    NewProductForm, Product, IMAGE_EXTENSIONS, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};
use bazaar_commerce::checkout::{OrderDetail, OrderSummary};
use bazaar_commerce::OrderId;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(super) struct Dashboard {
    products: Vec<Product>,
    products_in_stock: i64,
    orders: Vec<OrderSummary>,
}

pub(super) async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(Dashboard {
        products: state.catalog.list()?,
        products_in_stock: state.catalog.count_in_stock()?,
        orders: state.ledger.list_orders()?,
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct FormField {
    name: &'static str,
    kind: &'static str,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct AddProductForm {
    fields: [FormField; 5],
    image_extensions: &'static [&'static str],
}

/// Describes the multipart form `POST /admin/add` expects.
pub(super) async fn add_form() -> Json<AddProductForm> {
    Json(AddProductForm {
        fields: [
            FormField {
                name: "name",
                kind: "text",
                required: true,
                max_length: Some(MAX_NAME_LEN),
            },
            FormField {
                name: "price",
                kind: "integer",
                required: true,
                max_length: None,
            },
            FormField {
                name: "stock",
                kind: "integer",
                required: true,
                max_length: None,
            },
            FormField {
                name: "description",
                kind: "textarea",
                required: false,
                max_length: Some(MAX_DESCRIPTION_LEN),
            },
            FormField {
                name: "image",
                kind: "file",
                required: true,
                max_length: None,
            },
        ],
        image_extensions: IMAGE_EXTENSIONS,
    })
}

pub(super) async fn add_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Redirect> {
    let mut form = NewProductForm::default();
    let mut image = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = field_text(field).await?,
            "price" => form.price = field_text(field).await?,
            "stock" => form.stock = field_text(field).await?,
            "description" => form.description = field_text(field).await?,
            "image" => {
                form.image_filename = field.file_name().map(str::to_string);
                image = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read image: {e}")))?
                    .to_vec();
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let draft = form.validate().map_err(ApiError::validation)?;
    let file_name = form.image_filename.unwrap_or_default();
    let url = state.images.save(&file_name, &image).await?;

    match state.catalog.insert(&draft.with_image(url.clone())) {
        Ok(_) => Ok(Redirect::to("/admin")),
        Err(err) => {
            if let Err(e) = state.images.remove(&url).await {
                tracing::warn!(image = %url, "failed to remove orphaned image: {}", e);
            }
            Err(err.into())
        }
    }
}

pub(super) async fn order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    let id: OrderId = id
        .parse()
        .map_err(|_| ApiError::not_found(format!("Order not found: {id}")))?;
    Ok(Json(state.ledger.get_order(id)?))
}

async fn field_text(field: Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed form field: {e}")))
}
