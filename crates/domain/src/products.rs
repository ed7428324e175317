//! Product lifecycle guard and product management.
//!
//! A product referenced by any order line item cannot be deleted;
//! the check runs at the application layer rather than relying on
//! store-side referential integrity.

use common::{Money, ProductId};
use record_store::{MemoryStore, Product};

use crate::error::{DomainError, Result};

/// Command to create a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: u32,
}

/// Partial update of a product's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,
}

/// Service for managing products.
#[derive(Debug, Clone)]
pub struct ProductService {
    store: MemoryStore,
}

impl ProductService {
    /// Creates a new product service backed by the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Creates a product and returns the persisted record.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: NewProduct) -> Result<Product> {
        let mut uow = self.store.begin().await;
        let id = uow.insert_product(cmd.name.clone(), cmd.price, cmd.stock);
        uow.commit();

        tracing::info!(product_id = %id, "product created");
        Ok(Product {
            id,
            name: cmd.name,
            price: cmd.price,
            stock: cmd.stock,
        })
    }

    /// Creates several products in one unit of work.
    #[tracing::instrument(skip(self, batch))]
    pub async fn create_products(&self, batch: Vec<NewProduct>) -> Result<Vec<ProductId>> {
        let mut uow = self.store.begin().await;
        let ids = batch
            .into_iter()
            .map(|p| uow.insert_product(p.name, p.price, p.stock))
            .collect();
        uow.commit();
        Ok(ids)
    }

    /// Lists products, optionally filtered by a name substring.
    pub async fn list_products(&self, name_filter: Option<&str>) -> Vec<Product> {
        let snapshot = self.store.read().await;
        snapshot
            .products()
            .filter(|p| name_filter.is_none_or(|needle| p.name.contains(needle)))
            .cloned()
            .collect()
    }

    /// Applies a partial update to a product's fields.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let mut uow = self.store.begin().await;
        let product = uow
            .product_mut(id)
            .ok_or(DomainError::ProductNotFound(id))?;

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }

        let updated = product.clone();
        uow.commit();
        Ok(updated)
    }

    /// Adds `amount` units to a product's stock. Restocking by zero
    /// is a caller error, as is pushing stock past `u32::MAX`.
    #[tracing::instrument(skip(self))]
    pub async fn restock_product(&self, id: ProductId, amount: u32) -> Result<Product> {
        if amount == 0 {
            return Err(DomainError::InvalidQuantity { quantity: amount });
        }

        let mut uow = self.store.begin().await;
        let product = uow
            .product_mut(id)
            .ok_or(DomainError::ProductNotFound(id))?;
        product.stock = product
            .stock
            .checked_add(amount)
            .ok_or(DomainError::StockOverflow { product_id: id })?;

        let updated = product.clone();
        uow.commit();

        metrics::counter!("products_restocked_total").increment(1);
        Ok(updated)
    }

    /// Deletes a product unless any order line item references it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut uow = self.store.begin().await;
        if uow.product(id).is_none() {
            return Err(DomainError::ProductNotFound(id));
        }
        if uow.product_referenced(id) {
            return Err(DomainError::ProductInUse { product_id: id });
        }
        uow.delete_product(id);
        uow.commit();

        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
