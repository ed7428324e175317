//! Route handlers, grouped per resource.

pub mod accounts;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use crate::error::ApiError;

/// Rejects a string field outside the allowed length range.
pub(crate) fn validate_len(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ApiError> {
    if value.len() < min || value.len() > max {
        return Err(ApiError::BadRequest(format!(
            "{field} must be between {min} and {max} characters long"
        )));
    }
    Ok(())
}

/// Wraps a body-shape deserialization failure as a 400.
pub(crate) fn bad_shape(err: serde_json::Error) -> ApiError {
    ApiError::BadRequest(format!("malformed request body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(validate_len("name", "ab", 1, 2).is_ok());
        assert!(validate_len("name", "", 1, 2).is_err());
        assert!(validate_len("name", "abc", 1, 2).is_err());
    }
}
