//! Domain layer for the order-management system.
//!
//! This crate provides the core business logic:
//! - the inventory ledger (allocation, reservation, release)
//! - the order fulfillment engine with atomic stock handling
//! - the account uniqueness and product lifecycle guards
//! - customer lifecycle with an explicit deletion cascade
//!
//! Every operation runs inside one record-store unit of work; a
//! failure at any step drops the unit, so no partial mutation is ever
//! observable.

pub mod accounts;
pub mod customers;
pub mod error;
pub mod ledger;
pub mod orders;
pub mod products;

pub use accounts::{AccountService, AccountUpdate, NewAccount};
pub use customers::{CustomerDetail, CustomerService, CustomerUpdate, NewCustomer};
pub use error::{DomainError, Result};
pub use orders::{NewOrder, OrderDetail, OrderDetailLine, OrderService, OrderUpdate};
pub use products::{NewProduct, ProductService, ProductUpdate};
