//! Authentication service

use std::sync::Arc;

use tracing::{info, warn};

use super::credential::{AccountDescription, Credential};
use super::hasher::{SecretHasher, matches_blocking};
use crate::account::AccountStore;
use crate::errors::{BankError, ConfigError};
use crate::validation::ValidationStrategy;

/// Verifies credentials against stored accounts
pub struct AccessService {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn SecretHasher>,
    credential_validator: Arc<dyn ValidationStrategy<Credential>>,
    // Verified against when the tax id is unknown
    dummy_hash: String,
}

/// Secret behind `dummy_hash`; no account can authenticate with it
const DUMMY_SECRET: &str = "bankd-unknown-account";

impl AccessService {
    pub fn builder() -> AccessServiceBuilder {
        AccessServiceBuilder::default()
    }

    /// Validate the credential, look up the account by tax id and compare secrets
    ///
    /// An unknown tax id and a wrong secret both yield `InvalidCredentials`,
    /// after the same amount of hashing work.
    pub async fn authenticate(&self, credential: &Credential) -> Result<AccountDescription, BankError> {
        self.credential_validator.validate(credential)?;

        let account = match self.accounts.get_by_tax_id(&credential.tax_id).await {
            Ok(account) => account,
            Err(BankError::AccountNotFound) => {
                matches_blocking(
                    self.hasher.clone(),
                    self.dummy_hash.clone(),
                    credential.secret.clone(),
                )
                .await;
                warn!(op = "authenticate", "unknown tax id");
                return Err(BankError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let matched = matches_blocking(
            self.hasher.clone(),
            account.secret_hash.clone(),
            credential.secret.clone(),
        )
        .await;
        if !matched {
            warn!(op = "authenticate", account_id = %account.id, "secret mismatch");
            return Err(BankError::InvalidCredentials);
        }

        info!(op = "authenticate", account_id = %account.id, "authenticated");
        Ok(AccountDescription::from(&account))
    }
}

#[derive(Default)]
pub struct AccessServiceBuilder {
    accounts: Option<Arc<dyn AccountStore>>,
    hasher: Option<Arc<dyn SecretHasher>>,
    credential_validator: Option<Arc<dyn ValidationStrategy<Credential>>>,
}

impl AccessServiceBuilder {
    pub fn accounts(mut self, accounts: Arc<dyn AccountStore>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn credential_validator(mut self, validator: Arc<dyn ValidationStrategy<Credential>>) -> Self {
        self.credential_validator = Some(validator);
        self
    }

    pub fn build(self) -> Result<AccessService, ConfigError> {
        let hasher = self
            .hasher
            .ok_or_else(|| ConfigError::missing("AccessService", "hasher"))?;
        let dummy_hash = hasher
            .hash(DUMMY_SECRET)
            .map_err(|e| ConfigError::Invalid(format!("AccessService: {}", e)))?;
        Ok(AccessService {
            accounts: self
                .accounts
                .ok_or_else(|| ConfigError::missing("AccessService", "accounts"))?,
            hasher,
            credential_validator: self
                .credential_validator
                .ok_or_else(|| ConfigError::missing("AccessService", "credential_validator"))?,
            dummy_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Argon2Hasher, CredentialRules};
    use crate::account::Account;
    use crate::core_types::AccountId;
    use crate::persistence::memory::MemAccountStore;
    use chrono::Utc;

    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Argon2 with a count of `matches` calls
    struct CountingHasher {
        inner: Argon2Hasher,
        verifications: AtomicUsize,
    }

    impl SecretHasher for CountingHasher {
        fn hash(&self, secret: &str) -> Result<String, BankError> {
            self.inner.hash(secret)
        }

        fn matches(&self, hash: &str, secret: &str) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.matches(hash, secret)
        }
    }

    async fn setup() -> (AccessService, AccountId) {
        let (service, id, _) = setup_counting().await;
        (service, id)
    }

    async fn setup_counting() -> (AccessService, AccountId, Arc<CountingHasher>) {
        let store = Arc::new(MemAccountStore::new());
        let hasher = Arc::new(CountingHasher {
            inner: Argon2Hasher::with_params(8, 1, 1).unwrap(),
            verifications: AtomicUsize::new(0),
        });
        let account = store
            .store(Account {
                id: AccountId::generate(),
                name: "Jon Due".into(),
                tax_id: "00000000003".into(),
                secret_hash: hasher.hash("right").unwrap(),
                balance: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let service = AccessService::builder()
            .accounts(store)
            .hasher(hasher.clone())
            .credential_validator(Arc::new(CredentialRules))
            .build()
            .unwrap();
        (service, account.id, hasher)
    }

    fn credential(tax_id: &str, secret: &str) -> Credential {
        Credential {
            tax_id: tax_id.into(),
            secret: secret.into(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (service, id) = setup().await;
        let desc = service
            .authenticate(&credential("00000000003", "right"))
            .await
            .unwrap();
        assert_eq!(desc.account_id, id);
        assert_eq!(desc.name, "Jon Due");
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let (service, _) = setup().await;
        assert_eq!(
            service.authenticate(&credential("00000000003", "wrong")).await,
            Err(BankError::InvalidCredentials)
        );
        assert_eq!(
            service.authenticate(&credential("99999999999", "right")).await,
            Err(BankError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_unknown_tax_id_still_verifies_a_hash() {
        let (service, _, hasher) = setup_counting().await;

        assert_eq!(
            service.authenticate(&credential("99999999999", "right")).await,
            Err(BankError::InvalidCredentials)
        );
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 1);

        assert_eq!(
            service.authenticate(&credential("00000000003", "wrong")).await,
            Err(BankError::InvalidCredentials)
        );
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dummy_secret_does_not_open_unknown_accounts() {
        let (service, _) = setup().await;
        assert_eq!(
            service
                .authenticate(&credential("99999999999", DUMMY_SECRET))
                .await,
            Err(BankError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_authenticate_validates_first() {
        let (service, _) = setup().await;
        assert!(matches!(
            service.authenticate(&credential("123", "right")).await,
            Err(BankError::Validation(_))
        ));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = AccessService::builder().build().err().unwrap();
        assert_eq!(err, ConfigError::missing("AccessService", "hasher"));

        let err = AccessService::builder()
            .hasher(Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::missing("AccessService", "accounts"));
    }
}
