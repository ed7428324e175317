//! In-memory implementation of the transactional record store.
//!
//! The store holds every table behind one `RwLock`. A [`UnitOfWork`]
//! takes the write lock for its whole lifetime, so units of work are
//! serialized: two concurrent order creations can never validate
//! stock against a stale value. Mutations are staged on a scratch
//! copy of the tables and only become visible on [`UnitOfWork::commit`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use common::{CustomerId, Money, OrderId, ProductId};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, StoreError};
use crate::records::{Customer, CustomerAccount, Order, OrderLine, Product};

/// The full table set. Cloneable so a unit of work can stage
/// mutations on a private copy.
#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    accounts: BTreeMap<CustomerId, CustomerAccount>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_customer: i64,
    next_product: i64,
    next_order: i64,
}

/// In-memory record store.
///
/// Cheap to clone; all clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a unit of work, blocking other units until it commits
    /// or is dropped.
    pub async fn begin(&self) -> UnitOfWork<'_> {
        let guard = self.tables.write().await;
        let scratch = guard.clone();
        tracing::trace!("unit of work started");
        UnitOfWork { guard, scratch }
    }

    /// Takes a read-only snapshot of the committed state.
    pub async fn read(&self) -> Snapshot<'_> {
        Snapshot {
            guard: self.tables.read().await,
        }
    }
}

/// Read-only view of the committed tables.
#[derive(Debug)]
pub struct Snapshot<'a> {
    guard: RwLockReadGuard<'a, Tables>,
}

impl Snapshot<'_> {
    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.guard.customers.get(&id)
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.guard.customers.values()
    }

    pub fn account(&self, customer_id: CustomerId) -> Option<&CustomerAccount> {
        self.guard.accounts.get(&customer_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &CustomerAccount> {
        self.guard.accounts.values()
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.guard.products.get(&id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.guard.products.values()
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.guard.orders.get(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.guard.orders.values()
    }
}

/// An atomic, all-or-nothing group of reads and writes.
///
/// Every mutation targets the scratch copy. [`commit`](Self::commit)
/// publishes the copy as the new committed state; dropping the unit
/// without committing discards all of it, which is the rollback path
/// required by the fulfillment engine on any mid-unit failure.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    scratch: Tables,
}

impl UnitOfWork<'_> {
    // -- customers --

    /// Inserts a customer, assigning the next id.
    pub fn insert_customer(&mut self, name: String, email: String, phone: String) -> CustomerId {
        self.scratch.next_customer += 1;
        let id = CustomerId::new(self.scratch.next_customer);
        self.scratch.customers.insert(
            id,
            Customer {
                id,
                name,
                email,
                phone,
            },
        );
        id
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.scratch.customers.get(&id)
    }

    pub fn customer_mut(&mut self, id: CustomerId) -> Option<&mut Customer> {
        self.scratch.customers.get_mut(&id)
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.scratch.customers.values()
    }

    /// Removes a customer row. Returns false if no such row exists.
    pub fn delete_customer(&mut self, id: CustomerId) -> bool {
        self.scratch.customers.remove(&id).is_some()
    }

    // -- accounts --

    /// Inserts an account, enforcing the primary key (one account per
    /// customer) and the global username unique key.
    pub fn insert_account(&mut self, account: CustomerAccount) -> Result<()> {
        if self.scratch.accounts.contains_key(&account.customer_id) {
            return Err(StoreError::UniqueViolation {
                entity: "customer_account",
                detail: format!("customer {} already has an account", account.customer_id),
            });
        }
        if self.username_taken(&account.username) {
            return Err(StoreError::UniqueViolation {
                entity: "customer_account",
                detail: format!("username {:?} already taken", account.username),
            });
        }
        self.scratch.accounts.insert(account.customer_id, account);
        Ok(())
    }

    pub fn account(&self, customer_id: CustomerId) -> Option<&CustomerAccount> {
        self.scratch.accounts.get(&customer_id)
    }

    /// Mutable access to an account row. Callers changing the
    /// username must re-check [`username_taken`](Self::username_taken)
    /// first; the unique key is only enforced on insert.
    pub fn account_mut(&mut self, customer_id: CustomerId) -> Option<&mut CustomerAccount> {
        self.scratch.accounts.get_mut(&customer_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &CustomerAccount> {
        self.scratch.accounts.values()
    }

    pub fn delete_account(&mut self, customer_id: CustomerId) -> bool {
        self.scratch.accounts.remove(&customer_id).is_some()
    }

    /// Returns true if any account holds `username`.
    pub fn username_taken(&self, username: &str) -> bool {
        self.scratch
            .accounts
            .values()
            .any(|a| a.username == username)
    }

    // -- products --

    /// Inserts a product, assigning the next id.
    pub fn insert_product(&mut self, name: String, price: Money, stock: u32) -> ProductId {
        self.scratch.next_product += 1;
        let id = ProductId::new(self.scratch.next_product);
        self.scratch.products.insert(
            id,
            Product {
                id,
                name,
                price,
                stock,
            },
        );
        id
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.scratch.products.get(&id)
    }

    pub fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.scratch.products.get_mut(&id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.scratch.products.values()
    }

    pub fn delete_product(&mut self, id: ProductId) -> bool {
        self.scratch.products.remove(&id).is_some()
    }

    /// Returns true if any order's line items reference `product_id`.
    pub fn product_referenced(&self, product_id: ProductId) -> bool {
        self.scratch
            .orders
            .values()
            .any(|o| o.lines.iter().any(|l| l.product_id == product_id))
    }

    // -- orders --

    /// Inserts an order with its line items, assigning the next id.
    pub fn insert_order(
        &mut self,
        customer_id: CustomerId,
        date: NaiveDate,
        lines: Vec<OrderLine>,
    ) -> OrderId {
        self.scratch.next_order += 1;
        let id = OrderId::new(self.scratch.next_order);
        self.scratch.orders.insert(
            id,
            Order {
                id,
                customer_id,
                date,
                lines,
            },
        );
        id
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.scratch.orders.get(&id)
    }

    pub fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.scratch.orders.get_mut(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.scratch.orders.values()
    }

    /// Ids of all orders owned by `customer_id`.
    pub fn orders_for_customer(&self, customer_id: CustomerId) -> Vec<OrderId> {
        self.scratch
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .map(|o| o.id)
            .collect()
    }

    /// Deletes an order and its line items. Returns false if no such
    /// order exists.
    pub fn delete_order(&mut self, id: OrderId) -> bool {
        self.scratch.orders.remove(&id).is_some()
    }

    // -- transaction boundary --

    /// Publishes every staged mutation as the new committed state.
    pub fn commit(self) {
        let Self { mut guard, scratch } = self;
        *guard = scratch;
        tracing::trace!("unit of work committed");
    }

    /// Discards every staged mutation. Equivalent to dropping the
    /// unit, spelled out for call sites where the rollback is the
    /// point.
    pub fn rollback(self) {
        tracing::trace!("unit of work rolled back");
    }
}
