//! Inventory ledger: allocation, reservation, and release.
//!
//! Pure stock arithmetic, separated from order orchestration. The
//! reserve and release operations mutate a unit of work in place;
//! atomicity is the caller's concern — on any error the caller drops
//! the unit, so decrements made earlier in the same call never
//! survive a later failure.

use std::collections::BTreeMap;

use common::ProductId;
use record_store::{OrderLine, UnitOfWork};

use crate::error::{DomainError, Result};

/// Groups a possibly-repeating sequence of product references into
/// per-product quantities.
///
/// The result depends only on the multiset of ids, not their order:
/// two requests with the same references in any order produce the
/// same allocation map.
pub fn compute_allocations(product_refs: &[ProductId]) -> BTreeMap<ProductId, u32> {
    let mut allocations = BTreeMap::new();
    for &product_id in product_refs {
        *allocations.entry(product_id).or_insert(0) += 1;
    }
    allocations
}

/// Validates and decrements stock for every allocated product,
/// returning the line items to persist.
///
/// Products are visited in ascending id order, so the first failing
/// product is deterministic. Fails with [`DomainError::ProductNotFound`]
/// for an unresolvable id and [`DomainError::InsufficientStock`] when
/// stock is short; the caller must drop the unit of work on failure.
pub fn validate_and_reserve(
    uow: &mut UnitOfWork<'_>,
    allocations: &BTreeMap<ProductId, u32>,
) -> Result<Vec<OrderLine>> {
    let mut lines = Vec::with_capacity(allocations.len());
    for (&product_id, &quantity) in allocations {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        let product = uow
            .product_mut(product_id)
            .ok_or(DomainError::ProductNotFound(product_id))?;
        if product.stock < quantity {
            metrics::counter!("stock_rejections_total").increment(1);
            return Err(DomainError::InsufficientStock { product_id });
        }
        product.stock -= quantity;
        lines.push(OrderLine::new(product_id, quantity));
    }
    Ok(lines)
}

/// Adds each line item's quantity back to its product's stock.
///
/// Used before recomputing allocations on order replacement, and on
/// order deletion. The product lifecycle guard keeps referenced
/// products alive, so a missing product here means the store was
/// mutated outside the domain services.
pub fn release(uow: &mut UnitOfWork<'_>, lines: &[OrderLine]) -> Result<()> {
    for line in lines {
        let product = uow
            .product_mut(line.product_id)
            .ok_or(DomainError::ProductNotFound(line.product_id))?;
        // A restock between reservation and release can leave no room
        // for the returned units; clamp rather than wrap.
        product.stock = product.stock.saturating_add(line.quantity);
    }
    Ok(())
}
