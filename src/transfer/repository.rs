//! Transfer store capability

use std::sync::Arc;

use async_trait::async_trait;

use super::models::Transfer;
use crate::core_types::{AccountId, TransferId};
use crate::errors::BankError;
use crate::persistence::TransactionScope;

/// Append-only persistence of transfer records
#[async_trait]
pub trait TransferStore: Send + Sync {
    fn generate_identifier(&self) -> TransferId;

    /// Persist a transfer, setting `created_at`
    ///
    /// Fails with `MissingIdentity` on an empty id.
    async fn store(&self, transfer: Transfer) -> Result<Transfer, BankError>;

    async fn get_by_id(&self, id: &TransferId) -> Result<Transfer, BankError>;

    /// Transfers where the account is origin or destination, insertion order
    async fn list_by_account_id(&self, account_id: &AccountId) -> Result<Vec<Transfer>, BankError>;

    /// Handle whose writes participate in `scope`
    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn TransferStore>, BankError>;
}
