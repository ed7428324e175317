//! Product endpoints, including restock via `?restock=N`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::{Money, ProductId};
use domain::{NewProduct, ProductUpdate};
use record_store::Product;
use serde::Deserialize;

use super::{bad_shape, validate_len};
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateQuery {
    pub many: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateQuery {
    pub restock: Option<i64>,
}

#[derive(Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub price_cents: i64,
    /// Initial stock level; products default to one unit on hand.
    #[serde(default = "default_stock")]
    pub stock: u32,
}

fn default_stock() -> u32 {
    1
}

impl ProductPayload {
    fn into_command(self) -> Result<NewProduct, ApiError> {
        validate_len("name", &self.name, 1, 255)?;
        if self.price_cents < 0 {
            return Err(ApiError::BadRequest(
                "price_cents must not be negative".into(),
            ));
        }
        Ok(NewProduct {
            name: self.name,
            price: Money::from_cents(self.price_cents),
            stock: self.stock,
        })
    }
}

#[derive(Deserialize, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<u32>,
}

/// GET /products — lists products, filtered by `?name=` substring.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Product>> {
    Json(state.products.list_products(query.name.as_deref()).await)
}

/// POST /products — creates one product, or a batch with `?many=true`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    if query.many.as_deref() == Some("true") {
        let batch: Vec<ProductPayload> = serde_json::from_value(body).map_err(bad_shape)?;
        let commands = batch
            .into_iter()
            .map(ProductPayload::into_command)
            .collect::<Result<Vec<_>, _>>()?;
        let ids = state.products.create_products(commands).await?;
        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "product_ids": ids })),
        )
            .into_response())
    } else {
        let payload: ProductPayload = serde_json::from_value(body).map_err(bad_shape)?;
        let product = state
            .products
            .create_product(payload.into_command()?)
            .await?;
        Ok((StatusCode::CREATED, Json(product)).into_response())
    }
}

/// PUT /products/{id} — restock with `?restock=N` (positive integer),
/// otherwise a partial field update from the body.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<UpdateQuery>,
    body: Option<Json<ProductPatch>>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId::new(id);

    if let Some(amount) = query.restock {
        let amount = u32::try_from(amount)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| ApiError::BadRequest("restock by positive integer only".into()))?;
        let product = state.products.restock_product(id, amount).await?;
        return Ok(Json(product));
    }

    let patch = body.map(|Json(p)| p).unwrap_or_default();
    if let Some(name) = &patch.name {
        validate_len("name", name, 1, 255)?;
    }
    if let Some(price_cents) = patch.price_cents
        && price_cents < 0
    {
        return Err(ApiError::BadRequest(
            "price_cents must not be negative".into(),
        ));
    }

    let product = state
        .products
        .update_product(
            id,
            ProductUpdate {
                name: patch.name,
                price: patch.price_cents.map(Money::from_cents),
                stock: patch.stock,
            },
        )
        .await?;
    Ok(Json(product))
}

/// DELETE /products/{id} — fails with 409 while any order line
/// references the product.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.products.delete_product(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
