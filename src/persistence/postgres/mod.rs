//! PostgreSQL storage backend
//!
//! Stores run their statements either straight on the pool or, once scoped,
//! on the scope's open transaction. The transaction sits behind a shared
//! async mutex so every scoped store handle sees the same connection.
//! Dropping a scope that was never committed rolls it back.

mod accounts;
mod transfers;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::{Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use super::{StorageBackend, TransactionScope, canonical_lock_order};
use crate::account::AccountStore;
use crate::core_types::AccountId;
use crate::errors::BankError;
use crate::transfer::TransferStore;

pub use accounts::PgAccountStore;
pub use transfers::PgTransferStore;

type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// Where a store's statements run
#[derive(Clone)]
pub(crate) enum PgHandle {
    Pool(PgPool),
    Scoped(SharedTx),
}

impl PgHandle {
    /// Rebind to the transaction held by `scope`
    fn scoped(scope: &dyn TransactionScope) -> Result<Self, BankError> {
        let scope = scope
            .as_any()
            .downcast_ref::<PgScope>()
            .ok_or_else(|| BankError::Storage("scope was not opened by the postgres backend".into()))?;
        Ok(PgHandle::Scoped(scope.tx.clone()))
    }

    async fn acquire(&self) -> Result<PgConn<'_>, BankError> {
        match self {
            PgHandle::Pool(pool) => Ok(PgConn::Pooled(pool.acquire().await?)),
            PgHandle::Scoped(tx) => Ok(PgConn::Scoped(tx.lock().await)),
        }
    }
}

/// Connection borrowed for the duration of one store call
pub(crate) enum PgConn<'a> {
    Pooled(PoolConnection<Postgres>),
    Scoped(MutexGuard<'a, Option<Transaction<'static, Postgres>>>),
}

impl PgConn<'_> {
    fn get(&mut self) -> Result<&mut PgConnection, BankError> {
        match self {
            PgConn::Pooled(conn) => Ok(&mut **conn),
            PgConn::Scoped(guard) => (**guard)
                .as_mut()
                .map(|tx| &mut **tx)
                .ok_or(BankError::ScopeClosed),
        }
    }
}

/// Native transaction scope
pub struct PgScope {
    tx: SharedTx,
}

impl PgScope {
    async fn take(&self) -> Result<Transaction<'static, Postgres>, BankError> {
        self.tx.lock().await.take().ok_or(BankError::ScopeClosed)
    }
}

#[async_trait]
impl TransactionScope for PgScope {
    async fn lock_accounts(&self, ids: &[AccountId]) -> Result<(), BankError> {
        let mut guard = self.tx.lock().await;
        let tx = (*guard).as_mut().ok_or(BankError::ScopeClosed)?;
        for id in canonical_lock_order(ids) {
            sqlx::query("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id.as_str())
                .fetch_optional(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn commit(&self) -> Result<(), BankError> {
        self.take().await?.commit().await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), BankError> {
        self.take().await?.rollback().await?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// sqlx/PostgreSQL backend over a shared pool
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageBackend for PgBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn accounts(&self) -> Arc<dyn AccountStore> {
        Arc::new(PgAccountStore::new(PgHandle::Pool(self.pool.clone())))
    }

    fn transfers(&self) -> Arc<dyn TransferStore> {
        Arc::new(PgTransferStore::new(PgHandle::Pool(self.pool.clone())))
    }

    async fn begin(&self) -> Result<Box<dyn TransactionScope>, BankError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgScope {
            tx: Arc::new(Mutex::new(Some(tx))),
        }))
    }

    async fn health_check(&self) -> Result<(), BankError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
