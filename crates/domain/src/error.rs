//! Domain error taxonomy.
//!
//! Every service operation returns one of these discriminated
//! failures; nothing in the domain is fatal to the process, and any
//! error raised mid-unit causes the whole unit of work to be dropped.

use common::{CustomerId, OrderId, ProductId};
use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced customer does not exist.
    #[error("Customer {0} does not exist")]
    CustomerNotFound(CustomerId),

    /// The referenced product does not exist.
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),

    /// The referenced order does not exist.
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),

    /// The referenced customer has no account.
    #[error("Customer {0} has no account")]
    AccountNotFound(CustomerId),

    /// The customer already has an account.
    #[error("Only one account may exist per customer (customer {customer_id})")]
    AccountAlreadyExists { customer_id: CustomerId },

    /// Another account already holds this username.
    #[error("Username {username:?} is already taken")]
    UsernameTaken { username: String },

    /// The product is referenced by existing order line items.
    #[error("Cannot delete product {product_id} while orders reference it")]
    ProductInUse { product_id: ProductId },

    /// Not enough stock to satisfy the requested quantity.
    #[error("Insufficient supply of product {product_id} to process this order")]
    InsufficientStock { product_id: ProductId },

    /// Zero or otherwise unusable quantity supplied by the caller.
    #[error("Invalid quantity {quantity}: must be greater than 0")]
    InvalidQuantity { quantity: u32 },

    /// Restocking would push the product's stock past the
    /// representable maximum.
    #[error("Restocking product {product_id} would overflow its stock")]
    StockOverflow { product_id: ProductId },

    /// A store-level constraint violation surfaced past the guards.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
