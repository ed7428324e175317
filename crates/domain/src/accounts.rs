//! Account uniqueness guard and account lifecycle.
//!
//! All creation checks (customer exists, at most one account per
//! customer, globally unique username) happen before the insert,
//! inside the same unit of work, so no partial account is ever
//! observable.

use common::CustomerId;
use record_store::{CustomerAccount, MemoryStore};

use crate::error::{DomainError, Result};

/// Command to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub username: String,
    pub password: String,
}

/// Partial update of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Service for managing customer accounts.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: MemoryStore,
}

impl AccountService {
    /// Creates a new account service backed by the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Creates an account after the uniqueness checks pass.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub async fn create_account(&self, cmd: NewAccount) -> Result<CustomerAccount> {
        let mut uow = self.store.begin().await;

        if uow.customer(cmd.customer_id).is_none() {
            return Err(DomainError::CustomerNotFound(cmd.customer_id));
        }
        if uow.account(cmd.customer_id).is_some() {
            return Err(DomainError::AccountAlreadyExists {
                customer_id: cmd.customer_id,
            });
        }
        if uow.username_taken(&cmd.username) {
            return Err(DomainError::UsernameTaken {
                username: cmd.username,
            });
        }

        let account = CustomerAccount {
            customer_id: cmd.customer_id,
            username: cmd.username,
            password: cmd.password,
        };
        uow.insert_account(account.clone())?;
        uow.commit();

        tracing::info!(customer_id = %account.customer_id, "account created");
        Ok(account)
    }

    /// Lists all accounts.
    pub async fn list_accounts(&self) -> Vec<CustomerAccount> {
        self.store.read().await.accounts().cloned().collect()
    }

    /// Applies a partial update; a username change re-checks the
    /// global unique key.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_account(
        &self,
        customer_id: CustomerId,
        update: AccountUpdate,
    ) -> Result<CustomerAccount> {
        let mut uow = self.store.begin().await;

        let current = uow
            .account(customer_id)
            .ok_or(DomainError::AccountNotFound(customer_id))?;

        if let Some(username) = &update.username
            && *username != current.username
            && uow.username_taken(username)
        {
            return Err(DomainError::UsernameTaken {
                username: username.clone(),
            });
        }

        let account = uow
            .account_mut(customer_id)
            .ok_or(DomainError::AccountNotFound(customer_id))?;
        if let Some(username) = update.username {
            account.username = username;
        }
        if let Some(password) = update.password {
            account.password = password;
        }

        let updated = account.clone();
        uow.commit();
        Ok(updated)
    }

    /// Deletes a customer's account.
    #[tracing::instrument(skip(self))]
    pub async fn delete_account(&self, customer_id: CustomerId) -> Result<()> {
        let mut uow = self.store.begin().await;
        if !uow.delete_account(customer_id) {
            return Err(DomainError::AccountNotFound(customer_id));
        }
        uow.commit();
        Ok(())
    }
}
