//! Entity records persisted by the store.
//!
//! Records carry no business logic. Referential fields (a line's
//! product, an order's customer) are validated by the domain services
//! before a unit of work commits, not by the records themselves.

use chrono::NaiveDate;
use common::{CustomerId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// A customer. Owns zero-or-one account and zero-or-more orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A customer's login account.
///
/// Keyed by the owning customer's id: the shared identity value is
/// what makes the relation one-to-one. Usernames are globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccount {
    pub customer_id: CustomerId,
    pub username: String,
    pub password: String,
}

/// A product with a stock level.
///
/// Stock is `u32`, so it is non-negative by construction; every
/// decrement goes through the inventory ledger's sufficiency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: u32,
}

/// A line item: one product's allocation within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a line item for a product and quantity.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// An order with its exclusively-owned line items.
///
/// Lines are insertion-ordered and hold at most one entry per
/// product; duplicate references are coalesced before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Returns the line referencing `product_id`, if any.
    pub fn line(&self, product_id: ProductId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }
}
