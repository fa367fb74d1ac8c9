//! Persistence backends
//!
//! Two interchangeable implementations of the store capabilities:
//!
//! - [`memory`]: single-process, non-durable. Writes are applied immediately
//!   and the transaction scope is advisory; it only carries per-account locks.
//! - [`postgres`]: sqlx/PostgreSQL. The scope is a native transaction and
//!   account rows are locked with `SELECT ... FOR UPDATE`.
//!
//! The backend is chosen once at startup and shared by `Arc`.

pub mod memory;
pub mod postgres;
pub mod schema;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::account::AccountStore;
use crate::config::{StorageConfig, StorageKind};
use crate::core_types::AccountId;
use crate::db::Database;
use crate::errors::BankError;
use crate::transfer::TransferStore;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

/// Atomicity boundary spanning several store writes
///
/// Obtained once per top-level operation from [`StorageBackend::begin`].
/// `commit` and `rollback` close the scope; any later call fails with
/// `ScopeClosed`.
#[async_trait]
pub trait TransactionScope: Send + Sync {
    /// Take exclusive locks on the given accounts until the scope closes
    ///
    /// Locks are acquired in [`canonical_lock_order`] so two scopes touching
    /// the same pair of accounts cannot deadlock. Unknown ids are skipped.
    async fn lock_accounts(&self, ids: &[AccountId]) -> Result<(), BankError>;

    async fn commit(&self) -> Result<(), BankError>;

    async fn rollback(&self) -> Result<(), BankError>;

    /// Used by backends to recover their concrete scope type
    fn as_any(&self) -> &dyn Any;
}

/// A persistence technology: its two stores plus the scope factory
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn accounts(&self) -> Arc<dyn AccountStore>;

    fn transfers(&self) -> Arc<dyn TransferStore>;

    /// Open a new transaction scope
    async fn begin(&self) -> Result<Box<dyn TransactionScope>, BankError>;

    async fn health_check(&self) -> Result<(), BankError>;
}

/// Sorted, de-duplicated ids with empty values removed
pub fn canonical_lock_order(ids: &[AccountId]) -> Vec<AccountId> {
    let mut ordered: Vec<AccountId> = ids.iter().filter(|id| !id.is_empty()).cloned().collect();
    ordered.sort();
    ordered.dedup();
    ordered
}

/// Roll `scope` back and hand `cause` back to the caller
///
/// A rollback failure is logged; the original cause is what callers see.
pub async fn abort(scope: &dyn TransactionScope, cause: BankError) -> BankError {
    if let Err(e) = scope.rollback().await {
        tracing::error!(error = %e, cause = %cause, "rollback failed");
    }
    cause
}

/// Build the backend selected by configuration
pub async fn open_backend(config: &StorageConfig) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config.backend {
        StorageKind::Memory => {
            tracing::info!("Using in-memory storage backend (non-durable)");
            Ok(Arc::new(MemoryBackend::new()))
        }
        StorageKind::Postgres => {
            let url = config.postgres_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("storage.postgres_url is required for the postgres backend")
            })?;
            let db = Database::connect(url, config.max_connections).await?;
            db.ensure_schema().await?;
            tracing::info!("Using PostgreSQL storage backend");
            Ok(Arc::new(PgBackend::new(db.pool().clone())))
        }
    }
}
