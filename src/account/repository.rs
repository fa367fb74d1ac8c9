//! Account store capability

use std::sync::Arc;

use async_trait::async_trait;

use super::models::Account;
use crate::core_types::AccountId;
use crate::errors::BankError;
use crate::persistence::TransactionScope;

/// Persistence of account records, backend-agnostic
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Produce an identifier no stored account uses
    fn generate_identifier(&self) -> AccountId;

    /// Persist a new account
    ///
    /// `created_at` is set by the store; the caller's value is discarded.
    /// Fails with `MissingIdentity` on an empty id and `DuplicateIdentity`
    /// when the tax id (or id) is already taken.
    async fn store(&self, account: Account) -> Result<Account, BankError>;

    /// Overwrite the balance of an existing account; no other field changes
    async fn update_balance(&self, account: &Account) -> Result<(), BankError>;

    async fn get_by_id(&self, id: &AccountId) -> Result<Account, BankError>;

    /// Lookup used by authentication
    async fn get_by_tax_id(&self, tax_id: &str) -> Result<Account, BankError>;

    /// Snapshot of every account in insertion order
    async fn list_all(&self) -> Result<Vec<Account>, BankError>;

    /// Handle whose writes participate in `scope`
    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn AccountStore>, BankError>;
}
