//! Order endpoints: creation, detail with totals, partial update,
//! deletion.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{CustomerId, OrderId, ProductId};
use domain::{NewOrder, OrderDetail, OrderUpdate};
use record_store::Order;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct OrderPayload {
    pub customer_id: i64,
    pub date: NaiveDate,
    /// Possibly-repeating product references; duplicates become one
    /// line item with a summed quantity.
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct OrderPatch {
    pub customer_id: Option<i64>,
    pub date: Option<NaiveDate>,
    /// Absent means "leave the line items untouched"; present (even
    /// if empty) replaces them.
    pub product_ids: Option<Vec<i64>>,
}

fn product_refs(ids: Vec<i64>) -> Vec<ProductId> {
    ids.into_iter().map(ProductId::new).collect()
}

/// GET /orders — lists all orders.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.orders.list_orders().await)
}

/// GET /orders/{id} — order joined with product data and totals.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>, ApiError> {
    let detail = state.orders.get_order(OrderId::new(id)).await?;
    Ok(Json(detail))
}

/// POST /orders — creates an order, atomically reserving stock.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OrderPayload>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state
        .orders
        .create_order(NewOrder {
            customer_id: CustomerId::new(payload.customer_id),
            date: payload.date,
            product_refs: product_refs(payload.product_ids),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /orders/{id} — partial update; a present `product_ids` list
/// replaces the order's line items against restored stock.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders
        .update_order(
            OrderId::new(id),
            OrderUpdate {
                customer_id: patch.customer_id.map(CustomerId::new),
                date: patch.date,
                product_refs: patch.product_ids.map(product_refs),
            },
        )
        .await?;
    Ok(Json(order))
}

/// DELETE /orders/{id} — deletes the order, restoring stock.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.orders.delete_order(OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
