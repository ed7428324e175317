//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use record_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request shape (missing field, bad type, out-of-range
    /// value). Rejected before the core is involved.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::CustomerNotFound(_)
        | DomainError::ProductNotFound(_)
        | DomainError::OrderNotFound(_)
        | DomainError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InsufficientStock { .. }
        | DomainError::InvalidQuantity { .. }
        | DomainError::StockOverflow { .. } => StatusCode::BAD_REQUEST,
        DomainError::AccountAlreadyExists { .. }
        | DomainError::UsernameTaken { .. }
        | DomainError::ProductInUse { .. }
        | DomainError::Store(StoreError::UniqueViolation { .. }) => StatusCode::CONFLICT,
    };
    if status == StatusCode::CONFLICT {
        tracing::debug!(error = %err, "request rejected with conflict");
    }
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
