use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::PgHandle;
use crate::core_types::{AccountId, TransferId};
use crate::errors::BankError;
use crate::persistence::TransactionScope;
use crate::transfer::{Transfer, TransferStore};

const TRANSFER_COLUMNS: &str =
    "id, account_origin_id, account_destination_id, amount, created_at";

#[derive(Debug, FromRow)]
struct TransferRow {
    id: String,
    account_origin_id: String,
    account_destination_id: String,
    amount: i64,
    created_at: DateTime<Utc>,
}

impl From<TransferRow> for Transfer {
    fn from(row: TransferRow) -> Self {
        Transfer {
            id: TransferId::from(row.id),
            account_origin_id: AccountId::from(row.account_origin_id),
            account_destination_id: AccountId::from(row.account_destination_id),
            amount: row.amount,
            created_at: Some(row.created_at),
        }
    }
}

/// Transfer store over the `transfers` table
#[derive(Clone)]
pub struct PgTransferStore {
    handle: PgHandle,
}

impl PgTransferStore {
    pub(crate) fn new(handle: PgHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl TransferStore for PgTransferStore {
    fn generate_identifier(&self) -> TransferId {
        TransferId::generate()
    }

    async fn store(&self, transfer: Transfer) -> Result<Transfer, BankError> {
        if transfer.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut conn = self.handle.acquire().await?;
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO transfers (id, account_origin_id, account_destination_id, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING created_at",
        )
        .bind(transfer.id.as_str())
        .bind(transfer.account_origin_id.as_str())
        .bind(transfer.account_destination_id.as_str())
        .bind(transfer.amount)
        .fetch_one(conn.get()?)
        .await?;

        Ok(Transfer {
            created_at: Some(created_at),
            ..transfer
        })
    }

    async fn get_by_id(&self, id: &TransferId) -> Result<Transfer, BankError> {
        if id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut conn = self.handle.acquire().await?;
        let row: Option<TransferRow> =
            sqlx::query_as(&format!("SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(conn.get()?)
                .await?;
        row.map(Transfer::from).ok_or(BankError::TransferNotFound)
    }

    async fn list_by_account_id(&self, account_id: &AccountId) -> Result<Vec<Transfer>, BankError> {
        let mut conn = self.handle.acquire().await?;
        let rows: Vec<TransferRow> = sqlx::query_as(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers
             WHERE account_origin_id = $1 OR account_destination_id = $1
             ORDER BY seq"
        ))
        .bind(account_id.as_str())
        .fetch_all(conn.get()?)
        .await?;
        Ok(rows.into_iter().map(Transfer::from).collect())
    }

    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn TransferStore>, BankError> {
        Ok(Arc::new(Self::new(PgHandle::scoped(scope)?)))
    }
}
