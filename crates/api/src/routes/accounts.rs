//! Customer account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::{AccountUpdate, NewAccount};
use record_store::CustomerAccount;
use serde::Deserialize;

use super::validate_len;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct AccountPayload {
    pub customer_id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// GET /customer_accounts — lists all accounts.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<CustomerAccount>> {
    Json(state.accounts.list_accounts().await)
}

/// POST /customer_accounts — creates an account; the domain guard
/// enforces customer existence and both uniqueness rules.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AccountPayload>,
) -> Result<(StatusCode, Json<CustomerAccount>), ApiError> {
    validate_len("username", &payload.username, 1, 255)?;
    validate_len("password", &payload.password, 1, 255)?;

    let account = state
        .accounts
        .create_account(NewAccount {
            customer_id: CustomerId::new(payload.customer_id),
            username: payload.username,
            password: payload.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// PUT /customer_accounts/{customer_id} — partial update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    Json(patch): Json<AccountPatch>,
) -> Result<Json<CustomerAccount>, ApiError> {
    if let Some(username) = &patch.username {
        validate_len("username", username, 1, 255)?;
    }
    if let Some(password) = &patch.password {
        validate_len("password", password, 1, 255)?;
    }

    let account = state
        .accounts
        .update_account(
            CustomerId::new(customer_id),
            AccountUpdate {
                username: patch.username,
                password: patch.password,
            },
        )
        .await?;
    Ok(Json(account))
}

/// DELETE /customer_accounts/{customer_id}.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .accounts
        .delete_account(CustomerId::new(customer_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
