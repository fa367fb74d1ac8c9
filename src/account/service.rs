//! Account application service

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use super::models::{Account, NewAccount};
use crate::access::{SecretHasher, hash_blocking};
use crate::core_types::{AccountId, Cents};
use crate::errors::{BankError, ConfigError};
use crate::persistence::{StorageBackend, abort};
use crate::validation::ValidationStrategy;

/// Account lifecycle over a storage backend
pub struct AccountService {
    backend: Arc<dyn StorageBackend>,
    hasher: Arc<dyn SecretHasher>,
    creation_validator: Arc<dyn ValidationStrategy<NewAccount>>,
    balance_validator: Arc<dyn ValidationStrategy<Account>>,
    timeout: Duration,
}

/// Deadline for a balance overwrite, lock wait included
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5_000);

impl AccountService {
    pub fn builder() -> AccountServiceBuilder {
        AccountServiceBuilder::default()
    }

    /// Assign an id, validate, hash the secret and persist
    pub async fn create_account(&self, mut input: NewAccount) -> Result<Account, BankError> {
        let accounts = self.backend.accounts();
        input.id = accounts.generate_identifier();
        self.creation_validator.validate(&input)?;

        let secret_hash = hash_blocking(self.hasher.clone(), input.secret).await?;
        let account = Account {
            id: input.id,
            name: input.name.trim().to_string(),
            tax_id: input.tax_id,
            secret_hash,
            balance: input.balance,
            created_at: Utc::now(),
        };

        let stored = accounts.store(account).await?;
        info!(op = "create_account", account_id = %stored.id, balance = stored.balance, "account created");
        Ok(stored)
    }

    /// Overwrite the balance of an existing account
    ///
    /// Runs in its own scope holding the account lock, so it never
    /// interleaves with a transfer touching the same account. Not exposed
    /// over HTTP.
    pub async fn update_balance(&self, account: &Account) -> Result<(), BankError> {
        self.balance_validator.validate(account)?;

        match tokio::time::timeout(self.timeout, self.overwrite_balance(account)).await {
            Ok(Ok(())) => {
                info!(op = "update_balance", account_id = %account.id, balance = account.balance, "balance updated");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                error!(
                    op = "update_balance",
                    account_id = %account.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "balance update deadline exceeded, scope abandoned"
                );
                Err(BankError::Timeout)
            }
        }
    }

    async fn overwrite_balance(&self, account: &Account) -> Result<(), BankError> {
        let scope = self.backend.begin().await?;
        let result: Result<(), BankError> = async {
            scope.lock_accounts(std::slice::from_ref(&account.id)).await?;
            self.backend
                .accounts()
                .scoped_to(scope.as_ref())?
                .update_balance(account)
                .await
        }
        .await;

        match result {
            Ok(()) => scope.commit().await,
            Err(e) => Err(abort(scope.as_ref(), e).await),
        }
    }

    pub async fn account_balance(&self, id: &AccountId) -> Result<Cents, BankError> {
        let account = self.backend.accounts().get_by_id(id).await?;
        debug!(op = "account_balance", account_id = %id, balance = account.balance);
        Ok(account.balance)
    }

    pub async fn get_account(&self, id: &AccountId) -> Result<Account, BankError> {
        self.backend.accounts().get_by_id(id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, BankError> {
        self.backend.accounts().list_all().await
    }
}

#[derive(Default)]
pub struct AccountServiceBuilder {
    backend: Option<Arc<dyn StorageBackend>>,
    hasher: Option<Arc<dyn SecretHasher>>,
    creation_validator: Option<Arc<dyn ValidationStrategy<NewAccount>>>,
    balance_validator: Option<Arc<dyn ValidationStrategy<Account>>>,
    timeout: Option<Duration>,
}

impl AccountServiceBuilder {
    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn creation_validator(mut self, validator: Arc<dyn ValidationStrategy<NewAccount>>) -> Self {
        self.creation_validator = Some(validator);
        self
    }

    pub fn balance_validator(mut self, validator: Arc<dyn ValidationStrategy<Account>>) -> Self {
        self.balance_validator = Some(validator);
        self
    }

    /// Deadline for `update_balance`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<AccountService, ConfigError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_LOCK_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::Invalid("balance update timeout must be positive".into()));
        }
        Ok(AccountService {
            backend: self
                .backend
                .ok_or_else(|| ConfigError::missing("AccountService", "backend"))?,
            hasher: self
                .hasher
                .ok_or_else(|| ConfigError::missing("AccountService", "hasher"))?,
            creation_validator: self
                .creation_validator
                .ok_or_else(|| ConfigError::missing("AccountService", "creation_validator"))?,
            balance_validator: self
                .balance_validator
                .ok_or_else(|| ConfigError::missing("AccountService", "balance_validator"))?,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Argon2Hasher;
    use crate::account::{AccountCreationRules, BalanceUpdateRules};
    use crate::errors::ValidationError;
    use crate::persistence::MemoryBackend;

    fn service() -> AccountService {
        AccountService::builder()
            .backend(Arc::new(MemoryBackend::new()))
            .hasher(Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()))
            .creation_validator(Arc::new(AccountCreationRules))
            .balance_validator(Arc::new(BalanceUpdateRules))
            .build()
            .unwrap()
    }

    fn new_account(tax_id: &str, balance: Cents) -> NewAccount {
        NewAccount {
            name: "  Jon Due ".into(),
            tax_id: tax_id.into(),
            secret: "a secret".into(),
            balance,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_account_assigns_id_and_hashes_secret() {
        let service = service();
        let account = service
            .create_account(new_account("00000000003", 100_000))
            .await
            .unwrap();
        assert!(account.id.is_well_formed());
        assert_eq!(account.name, "Jon Due");
        assert_ne!(account.secret_hash, "a secret");
        assert!(account.secret_hash.starts_with("$argon2id$"));
        assert_eq!(service.account_balance(&account.id).await.unwrap(), 100_000);
    }

    #[tokio::test]
    async fn test_create_account_rejects_invalid_input() {
        let service = service();
        assert!(matches!(
            service.create_account(new_account("123", 0)).await,
            Err(BankError::Validation(ValidationError::InvalidLength { .. }))
        ));
        assert!(service.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_account_duplicate_tax_id() {
        let service = service();
        service
            .create_account(new_account("00000000003", 0))
            .await
            .unwrap();
        assert_eq!(
            service.create_account(new_account("00000000003", 0)).await,
            Err(BankError::DuplicateIdentity)
        );
    }

    #[tokio::test]
    async fn test_update_balance() {
        let service = service();
        let account = service
            .create_account(new_account("00000000003", 10))
            .await
            .unwrap();

        service
            .update_balance(&Account::with_balance(account.id.clone(), 500))
            .await
            .unwrap();
        assert_eq!(service.account_balance(&account.id).await.unwrap(), 500);

        assert!(matches!(
            service
                .update_balance(&Account::with_balance(account.id.clone(), -1))
                .await,
            Err(BankError::Validation(ValidationError::Negative { .. }))
        ));
        assert_eq!(
            service
                .update_balance(&Account::with_balance(AccountId::generate(), 1))
                .await,
            Err(BankError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_update_balance_times_out_while_waiting_for_lock() {
        let backend = MemoryBackend::new();
        let service = AccountService::builder()
            .backend(Arc::new(backend.clone()))
            .hasher(Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()))
            .creation_validator(Arc::new(AccountCreationRules))
            .balance_validator(Arc::new(BalanceUpdateRules))
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let account = service
            .create_account(new_account("00000000003", 10))
            .await
            .unwrap();

        let holder = backend.begin().await.unwrap();
        holder.lock_accounts(&[account.id.clone()]).await.unwrap();

        assert_eq!(
            service
                .update_balance(&Account::with_balance(account.id.clone(), 500))
                .await,
            Err(BankError::Timeout)
        );
        assert_eq!(service.account_balance(&account.id).await.unwrap(), 10);

        holder.rollback().await.unwrap();
        service
            .update_balance(&Account::with_balance(account.id.clone(), 500))
            .await
            .unwrap();
        assert_eq!(service.account_balance(&account.id).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let service = service();
        let account = service
            .create_account(new_account("00000000003", 10))
            .await
            .unwrap();
        let first = service.get_account(&account.id).await.unwrap();
        let second = service.get_account(&account.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            service.list_accounts().await.unwrap(),
            service.list_accounts().await.unwrap()
        );
    }

    #[test]
    fn test_builder_reports_missing_validator() {
        let err = AccountService::builder()
            .backend(Arc::new(MemoryBackend::new()))
            .hasher(Arc::new(Argon2Hasher::new()))
            .creation_validator(Arc::new(AccountCreationRules))
            .build()
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::missing("AccountService", "balance_validator")
        );
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = AccountService::builder()
            .backend(Arc::new(MemoryBackend::new()))
            .hasher(Arc::new(Argon2Hasher::new()))
            .creation_validator(Arc::new(AccountCreationRules))
            .balance_validator(Arc::new(BalanceUpdateRules))
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
