//! Customer CRUD and detail endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::CustomerId;
use domain::{CustomerDetail, CustomerUpdate, NewCustomer};
use record_store::Customer;
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
pub struct CustomerPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerPayload {
    fn into_command(self) -> Result<NewCustomer, ApiError> {
        validate_len("name", &self.name, 1, 255)?;
        validate_len("email", &self.email, 1, 319)?;
        validate_len("phone", &self.phone, 1, 15)?;
        Ok(NewCustomer {
            name: self.name,
            email: self.email,
            phone: self.phone,
        })
    }
}

#[derive(Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// GET /customers — lists customers, filtered by `?name=` substring.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Customer>> {
    Json(state.customers.list_customers(query.name.as_deref()).await)
}

/// GET /customers/{id} — customer joined with account and orders.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDetail>, ApiError> {
    let detail = state.customers.get_customer(CustomerId::new(id)).await?;
    Ok(Json(detail))
}

/// POST /customers — creates one customer, or a batch with `?many=true`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    if query.many.as_deref() == Some("true") {
        let batch: Vec<CustomerPayload> = serde_json::from_value(body).map_err(bad_shape)?;
        let commands = batch
            .into_iter()
            .map(CustomerPayload::into_command)
            .collect::<Result<Vec<_>, _>>()?;
        let ids = state.customers.create_customers(commands).await?;
        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "customer_ids": ids })),
        )
            .into_response())
    } else {
        let payload: CustomerPayload = serde_json::from_value(body).map_err(bad_shape)?;
        let customer = state
            .customers
            .create_customer(payload.into_command()?)
            .await?;
        Ok((StatusCode::CREATED, Json(customer)).into_response())
    }
}

/// PUT /customers/{id} — partial field update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, ApiError> {
    if let Some(name) = &patch.name {
        validate_len("name", name, 1, 255)?;
    }
    if let Some(email) = &patch.email {
        validate_len("email", email, 1, 319)?;
    }
    if let Some(phone) = &patch.phone {
        validate_len("phone", phone, 1, 15)?;
    }

    let update = CustomerUpdate {
        name: patch.name,
        email: patch.email,
        phone: patch.phone,
    };
    let customer = state
        .customers
        .update_customer(CustomerId::new(id), update)
        .await?;
    Ok(Json(customer))
}

/// DELETE /customers/{id} — deletes the customer with its explicit
/// cascade (orders released and removed, account removed).
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.customers.delete_customer(CustomerId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
