//! Transactional record store for the order-management system.
//!
//! This crate provides the persistence boundary the domain layer works
//! against: plain entity records, an in-memory table set, and a
//! [`UnitOfWork`] handle with all-or-nothing semantics. A unit of work
//! stages every mutation against a scratch copy of the tables;
//! [`UnitOfWork::commit`] publishes the copy atomically, and dropping
//! an uncommitted unit discards every mutation.

pub mod error;
pub mod memory;
pub mod records;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, Snapshot, UnitOfWork};
pub use records::{Customer, CustomerAccount, Order, OrderLine, Product};
