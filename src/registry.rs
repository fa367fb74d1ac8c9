//! Service registry
//!
//! Built once at startup from a storage backend and handed to the gateway by
//! `Arc`. Every service shares the same backend.

use std::sync::Arc;
use std::time::Duration;

use crate::access::{AccessService, CredentialRules, SecretHasher};
use crate::account::{AccountCreationRules, AccountService, BalanceUpdateRules};
use crate::errors::ConfigError;
use crate::persistence::StorageBackend;
use crate::transfer::{TransferCreationRules, TransferEngine};

pub struct ServiceRegistry {
    pub backend: Arc<dyn StorageBackend>,
    pub accounts: Arc<AccountService>,
    pub transfers: Arc<TransferEngine>,
    pub access: Arc<AccessService>,
}

impl ServiceRegistry {
    /// Wire the services with the standard validation strategies
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        hasher: Arc<dyn SecretHasher>,
        transfer_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let accounts = AccountService::builder()
            .backend(backend.clone())
            .hasher(hasher.clone())
            .creation_validator(Arc::new(AccountCreationRules))
            .balance_validator(Arc::new(BalanceUpdateRules))
            .timeout(transfer_timeout)
            .build()?;

        let transfers = TransferEngine::builder()
            .backend(backend.clone())
            .transfer_validator(Arc::new(TransferCreationRules))
            .timeout(transfer_timeout)
            .build()?;

        let access = AccessService::builder()
            .accounts(backend.accounts())
            .hasher(hasher)
            .credential_validator(Arc::new(CredentialRules))
            .build()?;

        tracing::info!(backend = backend.name(), "service registry ready");
        Ok(Self {
            backend,
            accounts: Arc::new(accounts),
            transfers: Arc::new(transfers),
            access: Arc::new(access),
        })
    }
}
