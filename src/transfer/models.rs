//! Transfer record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{AccountId, Cents, TransferId};

/// Immutable record of a completed balance movement between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transfer {
    pub id: TransferId,
    pub account_origin_id: AccountId,
    pub account_destination_id: AccountId,
    /// Amount in cents, strictly positive
    #[schema(example = 25000)]
    pub amount: Cents,
    /// Set by the store; `None` until persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transfer {
    /// Build a record that has not been persisted yet
    pub fn pending(
        id: TransferId,
        account_origin_id: AccountId,
        account_destination_id: AccountId,
        amount: Cents,
    ) -> Self {
        Self {
            id,
            account_origin_id,
            account_destination_id,
            amount,
            created_at: None,
        }
    }

    /// True when `account_id` took part in this transfer in either role
    pub fn involves(&self, account_id: &AccountId) -> bool {
        &self.account_origin_id == account_id || &self.account_destination_id == account_id
    }
}

/// Transfer creation input (origin comes from the session)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferInput {
    pub account_destination_id: AccountId,
    /// Amount in cents
    #[schema(example = 25000)]
    pub amount: Cents,
}
