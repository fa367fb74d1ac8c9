use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::PgHandle;
use crate::account::{Account, AccountStore};
use crate::core_types::AccountId;
use crate::errors::BankError;
use crate::persistence::TransactionScope;

const ACCOUNT_COLUMNS: &str = "id, name, tax_id, secret_hash, balance, created_at";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: String,
    name: String,
    tax_id: String,
    secret_hash: String,
    balance: i64,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from(row.id),
            name: row.name,
            tax_id: row.tax_id,
            secret_hash: row.secret_hash,
            balance: row.balance,
            created_at: row.created_at,
        }
    }
}

/// Account store over the `accounts` table
#[derive(Clone)]
pub struct PgAccountStore {
    handle: PgHandle,
}

impl PgAccountStore {
    pub(crate) fn new(handle: PgHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    fn generate_identifier(&self) -> AccountId {
        AccountId::generate()
    }

    async fn store(&self, account: Account) -> Result<Account, BankError> {
        if account.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut conn = self.handle.acquire().await?;
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO accounts (id, name, tax_id, secret_hash, balance)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING created_at",
        )
        .bind(account.id.as_str())
        .bind(&account.name)
        .bind(&account.tax_id)
        .bind(&account.secret_hash)
        .bind(account.balance)
        .fetch_one(conn.get()?)
        .await?;

        tracing::info!(account_id = %account.id, "account stored");
        Ok(Account {
            created_at,
            ..account
        })
    }

    async fn update_balance(&self, account: &Account) -> Result<(), BankError> {
        if account.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut conn = self.handle.acquire().await?;
        let result = sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(account.balance)
            .bind(account.id.as_str())
            .execute(conn.get()?)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BankError::AccountNotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Account, BankError> {
        if id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut conn = self.handle.acquire().await?;
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(conn.get()?)
                .await?;
        row.map(Account::from).ok_or(BankError::AccountNotFound)
    }

    async fn get_by_tax_id(&self, tax_id: &str) -> Result<Account, BankError> {
        let mut conn = self.handle.acquire().await?;
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE tax_id = $1"))
                .bind(tax_id)
                .fetch_optional(conn.get()?)
                .await?;
        row.map(Account::from).ok_or(BankError::AccountNotFound)
    }

    async fn list_all(&self) -> Result<Vec<Account>, BankError> {
        let mut conn = self.handle.acquire().await?;
        let rows: Vec<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY seq"))
                .fetch_all(conn.get()?)
                .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn AccountStore>, BankError> {
        Ok(Arc::new(Self::new(PgHandle::scoped(scope)?)))
    }
}
