//! Order fulfillment engine.
//!
//! Orchestrates order creation, line-item replacement, field updates,
//! and deletion. Each operation is one unit of work: the customer and
//! product checks, the stock reservation or release, and the order
//! row mutation either all commit together or are all discarded.

use chrono::NaiveDate;
use common::{CustomerId, Money, OrderId, ProductId};
use record_store::{MemoryStore, Order, UnitOfWork};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::ledger;

/// Command to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    /// Possibly-repeating product references; duplicates are
    /// coalesced into one line item with a summed quantity.
    pub product_refs: Vec<ProductId>,
}

/// Partial update of an order.
///
/// `product_refs: None` leaves the line items untouched; only a
/// present list triggers the release-and-reallocate cycle. Field-only
/// updates never recompute allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub customer_id: Option<CustomerId>,
    pub date: Option<NaiveDate>,
    pub product_refs: Option<Vec<ProductId>>,
}

/// One line of an order detail view, joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// An order joined with product data and computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub products: Vec<OrderDetailLine>,
    pub total_quantity: u32,
    pub total_price: Money,
}

/// Service for managing orders.
#[derive(Debug, Clone)]
pub struct OrderService {
    store: MemoryStore,
}

impl OrderService {
    /// Creates a new order service backed by the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Creates an order, atomically reserving stock for every
    /// referenced product.
    ///
    /// Fails with [`DomainError::CustomerNotFound`],
    /// [`DomainError::ProductNotFound`], or
    /// [`DomainError::InsufficientStock`]; any failure leaves the
    /// order unpersisted and all stock untouched.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, cmd: NewOrder) -> Result<Order> {
        let mut uow = self.store.begin().await;

        if uow.customer(cmd.customer_id).is_none() {
            return Err(DomainError::CustomerNotFound(cmd.customer_id));
        }

        let allocations = ledger::compute_allocations(&cmd.product_refs);
        let lines = ledger::validate_and_reserve(&mut uow, &allocations)?;

        let id = uow.insert_order(cmd.customer_id, cmd.date, lines.clone());
        uow.commit();

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %id, lines = lines.len(), "order created");
        Ok(Order {
            id,
            customer_id: cmd.customer_id,
            date: cmd.date,
            lines,
        })
    }

    /// Applies a partial update to an order.
    ///
    /// When `product_refs` is present, the order's current line items
    /// are released back to stock first and the new references are
    /// allocated against the restored levels; a failure drops the
    /// whole unit, so the release is undone and the order keeps its
    /// original lines.
    #[tracing::instrument(skip(self))]
    pub async fn update_order(&self, order_id: OrderId, update: OrderUpdate) -> Result<Order> {
        let mut uow = self.store.begin().await;

        let order = uow
            .order(order_id)
            .ok_or(DomainError::OrderNotFound(order_id))?;
        let old_lines = order.lines.clone();

        let replaced_lines = update.product_refs.is_some();
        if let Some(refs) = &update.product_refs {
            ledger::release(&mut uow, &old_lines)?;
            let allocations = ledger::compute_allocations(refs);
            let lines = ledger::validate_and_reserve(&mut uow, &allocations)?;
            if let Some(order) = uow.order_mut(order_id) {
                order.lines = lines;
            }
        }

        if let Some(customer_id) = update.customer_id {
            if uow.customer(customer_id).is_none() {
                return Err(DomainError::CustomerNotFound(customer_id));
            }
            if let Some(order) = uow.order_mut(order_id) {
                order.customer_id = customer_id;
            }
        }

        if let Some(date) = update.date
            && let Some(order) = uow.order_mut(order_id)
        {
            order.date = date;
        }

        let updated = uow
            .order(order_id)
            .cloned()
            .ok_or(DomainError::OrderNotFound(order_id))?;
        uow.commit();

        if replaced_lines {
            metrics::counter!("orders_replaced_total").increment(1);
        }
        tracing::info!(order_id = %order_id, "order updated");
        Ok(updated)
    }

    /// Deletes an order, restoring every line item's quantity to its
    /// product's stock exactly once.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        let mut uow = self.store.begin().await;

        let lines = uow
            .order(order_id)
            .map(|o| o.lines.clone())
            .ok_or(DomainError::OrderNotFound(order_id))?;

        ledger::release(&mut uow, &lines)?;
        uow.delete_order(order_id);
        uow.commit();

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(order_id = %order_id, "order deleted");
        Ok(())
    }

    /// Loads an order with product data and computed totals.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderDetail> {
        let snapshot = self.store.read().await;
        let order = snapshot
            .order(order_id)
            .ok_or(DomainError::OrderNotFound(order_id))?;

        let mut products = Vec::with_capacity(order.lines.len());
        let mut total_quantity: u32 = 0;
        let mut total_price = Money::zero();
        for line in &order.lines {
            let product = snapshot
                .product(line.product_id)
                .ok_or(DomainError::ProductNotFound(line.product_id))?;
            total_quantity = total_quantity.saturating_add(line.quantity);
            total_price = total_price + product.price.times(line.quantity);
            products.push(OrderDetailLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: line.quantity,
            });
        }

        Ok(OrderDetail {
            order: order.clone(),
            products,
            total_quantity,
            total_price,
        })
    }

    /// Lists all orders.
    pub async fn list_orders(&self) -> Vec<Order> {
        self.store.read().await.orders().cloned().collect()
    }

    pub(crate) fn delete_in_unit(uow: &mut UnitOfWork<'_>, order_id: OrderId) -> Result<()> {
        let lines = uow
            .order(order_id)
            .map(|o| o.lines.clone())
            .ok_or(DomainError::OrderNotFound(order_id))?;
        ledger::release(uow, &lines)?;
        uow.delete_order(order_id);
        Ok(())
    }
}
