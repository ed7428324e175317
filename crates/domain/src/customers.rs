//! Customer lifecycle.
//!
//! Creation, partial update, listing with a name filter, a detail
//! view joining the account and orders, and deletion with an explicit
//! cascade: the customer's orders are deleted with their stock
//! released and the account is removed, all inside one unit of work,
//! so no line items are ever orphaned.

use common::CustomerId;
use record_store::{Customer, CustomerAccount, MemoryStore, Order};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::orders::OrderService;

/// Command to create a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Partial update of a customer's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A customer joined with its account and orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub account: Option<CustomerAccount>,
    pub orders: Vec<Order>,
}

/// Service for managing customers.
#[derive(Debug, Clone)]
pub struct CustomerService {
    store: MemoryStore,
}

impl CustomerService {
    /// Creates a new customer service backed by the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Creates a customer and returns the persisted record.
    #[tracing::instrument(skip(self))]
    pub async fn create_customer(&self, cmd: NewCustomer) -> Result<Customer> {
        let mut uow = self.store.begin().await;
        let id = uow.insert_customer(cmd.name.clone(), cmd.email.clone(), cmd.phone.clone());
        uow.commit();

        tracing::info!(customer_id = %id, "customer created");
        Ok(Customer {
            id,
            name: cmd.name,
            email: cmd.email,
            phone: cmd.phone,
        })
    }

    /// Creates several customers in one unit of work.
    #[tracing::instrument(skip(self, batch))]
    pub async fn create_customers(&self, batch: Vec<NewCustomer>) -> Result<Vec<CustomerId>> {
        let mut uow = self.store.begin().await;
        let ids = batch
            .into_iter()
            .map(|c| uow.insert_customer(c.name, c.email, c.phone))
            .collect();
        uow.commit();
        Ok(ids)
    }

    /// Lists customers, optionally filtered by a name substring.
    pub async fn list_customers(&self, name_filter: Option<&str>) -> Vec<Customer> {
        let snapshot = self.store.read().await;
        snapshot
            .customers()
            .filter(|c| name_filter.is_none_or(|needle| c.name.contains(needle)))
            .cloned()
            .collect()
    }

    /// Loads a customer with its account and orders.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<CustomerDetail> {
        let snapshot = self.store.read().await;
        let customer = snapshot
            .customer(id)
            .ok_or(DomainError::CustomerNotFound(id))?;
        let orders = snapshot
            .orders()
            .filter(|o| o.customer_id == id)
            .cloned()
            .collect();

        Ok(CustomerDetail {
            customer: customer.clone(),
            account: snapshot.account(id).cloned(),
            orders,
        })
    }

    /// Applies a partial update to a customer's fields.
    #[tracing::instrument(skip(self))]
    pub async fn update_customer(&self, id: CustomerId, update: CustomerUpdate) -> Result<Customer> {
        let mut uow = self.store.begin().await;
        let customer = uow
            .customer_mut(id)
            .ok_or(DomainError::CustomerNotFound(id))?;

        if let Some(name) = update.name {
            customer.name = name;
        }
        if let Some(email) = update.email {
            customer.email = email;
        }
        if let Some(phone) = update.phone {
            customer.phone = phone;
        }

        let updated = customer.clone();
        uow.commit();
        Ok(updated)
    }

    /// Deletes a customer, cascading to its orders and account.
    ///
    /// Every dependent order is deleted through the fulfillment
    /// engine's release path, so the stock allocated to the
    /// customer's orders is restored before the rows disappear.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut uow = self.store.begin().await;
        if uow.customer(id).is_none() {
            return Err(DomainError::CustomerNotFound(id));
        }

        for order_id in uow.orders_for_customer(id) {
            OrderService::delete_in_unit(&mut uow, order_id)?;
        }
        uow.delete_account(id);
        uow.delete_customer(id);
        uow.commit();

        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}
