use thiserror::Error;

/// Errors that can occur when mutating the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key constraint was violated on insert.
    #[error("unique key violation on {entity}: {detail}")]
    UniqueViolation {
        entity: &'static str,
        detail: String,
    },
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
