//! Secret hashing

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::BankError;

/// One-way hashing of account secrets
pub trait SecretHasher: Send + Sync {
    /// Produce a self-describing hash of `secret`
    fn hash(&self, secret: &str) -> Result<String, BankError>;

    /// True when `secret` matches `hash`; malformed hashes never match
    fn matches(&self, hash: &str, secret: &str) -> bool;
}

/// Argon2id with a random salt, PHC string output
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes)
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, BankError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| BankError::Hashing(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, BankError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| BankError::Hashing(e.to_string()))
    }

    fn matches(&self, hash: &str, secret: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored secret hash is malformed: {}", e);
                false
            }
        }
    }
}

/// Hash on the blocking pool; Argon2 is CPU-bound and must not stall a runtime worker
pub async fn hash_blocking(hasher: Arc<dyn SecretHasher>, secret: String) -> Result<String, BankError> {
    tokio::task::spawn_blocking(move || hasher.hash(&secret))
        .await
        .map_err(|e| BankError::Hashing(e.to_string()))?
}

/// Compare on the blocking pool; a failed task never matches
pub async fn matches_blocking(hasher: Arc<dyn SecretHasher>, hash: String, secret: String) -> bool {
    match tokio::task::spawn_blocking(move || hasher.matches(&hash, &secret)).await {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!("Secret comparison task failed: {}", e);
            false
        }
    }
}
