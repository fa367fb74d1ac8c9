//! Transfer engine
//!
//! Moves funds between two accounts inside one transaction scope:
//!
//! ```text
//! begin → lock(origin, destination) → load both → rules → debit → credit
//!       → store transfer record → commit
//! ```
//!
//! Any failure after `begin` rolls the scope back. The whole sequence runs
//! under a deadline; on expiry the in-flight future is dropped together with
//! its scope, which releases memory locks and rolls back a database
//! transaction.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::models::Transfer;
use crate::core_types::{AccountId, Cents, TransferId};
use crate::errors::{BankError, ConfigError};
use crate::persistence::{StorageBackend, TransactionScope, abort};
use crate::validation::ValidationStrategy;

/// Default deadline for one transfer
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_millis(5_000);

pub struct TransferEngine {
    backend: Arc<dyn StorageBackend>,
    transfer_validator: Arc<dyn ValidationStrategy<Transfer>>,
    timeout: Duration,
}

impl TransferEngine {
    pub fn builder() -> TransferEngineBuilder {
        TransferEngineBuilder::default()
    }

    /// Move `amount` cents from `origin_id` to `destination_id`
    pub async fn transfer(
        &self,
        origin_id: &AccountId,
        destination_id: &AccountId,
        amount: Cents,
    ) -> Result<Transfer, BankError> {
        match tokio::time::timeout(self.timeout, self.execute(origin_id, destination_id, amount)).await {
            Ok(Ok(transfer)) => {
                info!(
                    op = "transfer",
                    transfer_id = %transfer.id,
                    origin = %origin_id,
                    destination = %destination_id,
                    amount,
                    "transfer committed"
                );
                Ok(transfer)
            }
            Ok(Err(e)) => {
                warn!(op = "transfer", origin = %origin_id, destination = %destination_id, amount, error = %e, "transfer rejected");
                Err(e)
            }
            Err(_) => {
                error!(
                    op = "transfer",
                    origin = %origin_id,
                    destination = %destination_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "transfer deadline exceeded, scope abandoned"
                );
                Err(BankError::Timeout)
            }
        }
    }

    async fn execute(
        &self,
        origin_id: &AccountId,
        destination_id: &AccountId,
        amount: Cents,
    ) -> Result<Transfer, BankError> {
        let scope = self.backend.begin().await?;
        match self.apply(scope.as_ref(), origin_id, destination_id, amount).await {
            Ok(transfer) => {
                scope.commit().await?;
                Ok(transfer)
            }
            Err(e) => Err(abort(scope.as_ref(), e).await),
        }
    }

    /// Every step up to, not including, commit
    async fn apply(
        &self,
        scope: &dyn TransactionScope,
        origin_id: &AccountId,
        destination_id: &AccountId,
        amount: Cents,
    ) -> Result<Transfer, BankError> {
        scope
            .lock_accounts(&[origin_id.clone(), destination_id.clone()])
            .await?;

        let accounts = self.backend.accounts().scoped_to(scope)?;
        let transfers = self.backend.transfers().scoped_to(scope)?;

        let mut origin = accounts
            .get_by_id(origin_id)
            .await
            .map_err(|e| lookup_error(e, BankError::OriginNotFound))?;
        let mut destination = accounts
            .get_by_id(destination_id)
            .await
            .map_err(|e| lookup_error(e, BankError::DestinationNotFound))?;

        if origin.id == destination.id {
            return Err(BankError::SameAccountTransfer);
        }
        if amount <= 0 {
            return Err(BankError::MissingAmount);
        }
        if origin.balance < amount {
            return Err(BankError::InsufficientBalance);
        }

        origin.balance -= amount;
        destination.balance = destination
            .balance
            .checked_add(amount)
            .ok_or(BankError::AmountOverflow)?;

        accounts.update_balance(&origin).await?;
        accounts.update_balance(&destination).await?;

        let record = Transfer::pending(
            transfers.generate_identifier(),
            origin.id.clone(),
            destination.id.clone(),
            amount,
        );
        self.transfer_validator.validate(&record)?;
        transfers.store(record).await
    }

    /// Transfers the account took part in, insertion order
    ///
    /// A store failure is logged and reported as an empty list.
    pub async fn list_transfers_from_account(&self, account_id: &AccountId) -> Vec<Transfer> {
        match self.backend.transfers().list_by_account_id(account_id).await {
            Ok(transfers) => transfers,
            Err(e) => {
                error!(op = "list_transfers", account_id = %account_id, error = %e, "listing failed, returning empty result");
                Vec::new()
            }
        }
    }

    pub async fn get_transfer(&self, id: &TransferId) -> Result<Transfer, BankError> {
        self.backend.transfers().get_by_id(id).await
    }
}

/// Rewrite a store lookup failure into the engine's role-specific kind
fn lookup_error(e: BankError, not_found: BankError) -> BankError {
    match e {
        BankError::AccountNotFound => not_found,
        BankError::MissingIdentity => BankError::MissingData,
        other => other,
    }
}

#[derive(Default)]
pub struct TransferEngineBuilder {
    backend: Option<Arc<dyn StorageBackend>>,
    transfer_validator: Option<Arc<dyn ValidationStrategy<Transfer>>>,
    timeout: Option<Duration>,
}

impl TransferEngineBuilder {
    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn transfer_validator(mut self, validator: Arc<dyn ValidationStrategy<Transfer>>) -> Self {
        self.transfer_validator = Some(validator);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<TransferEngine, ConfigError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TRANSFER_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::Invalid("transfer timeout must be positive".into()));
        }
        Ok(TransferEngine {
            backend: self
                .backend
                .ok_or_else(|| ConfigError::missing("TransferEngine", "backend"))?,
            transfer_validator: self
                .transfer_validator
                .ok_or_else(|| ConfigError::missing("TransferEngine", "transfer_validator"))?,
            timeout,
        })
    }
}
