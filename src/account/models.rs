//! Data models for bank accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{AccountId, Cents};

/// Bank account
///
/// The store is the single source of truth for `balance`; a value held by a
/// caller is a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: AccountId,
    #[schema(example = "Jon Due")]
    pub name: String,
    #[schema(example = "12345678910")]
    pub tax_id: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip)]
    pub secret_hash: String,
    /// Balance in cents
    #[schema(example = 100000)]
    pub balance: Cents,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a transient value for `UpdateBalance`
    ///
    /// Only `id` and `balance` are read by the store; the other fields are
    /// left blank.
    pub fn with_balance(id: AccountId, balance: Cents) -> Self {
        Self {
            id,
            name: String::new(),
            tax_id: String::new(),
            secret_hash: String::new(),
            balance,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Account creation input
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewAccount {
    /// Assigned by the service before validation
    #[serde(skip)]
    pub id: AccountId,
    #[schema(example = "Jon Due")]
    pub name: String,
    #[schema(example = "12345678910")]
    pub tax_id: String,
    #[schema(example = "a secret")]
    pub secret: String,
    /// Opening balance in cents
    #[serde(default)]
    #[schema(example = 100000)]
    pub balance: Cents,
}

/// Account balance view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BalanceView {
    #[schema(example = 75000)]
    pub balance: Cents,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hash_never_serialized() {
        let account = Account {
            id: AccountId::generate(),
            name: "Jon Due".to_string(),
            tax_id: "00000000003".to_string(),
            secret_hash: "$argon2id$v=19$...".to_string(),
            balance: 10,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"balance\":10"));
    }

    #[test]
    fn test_new_account_ignores_caller_id() {
        let json = r#"{"id":"abc","name":"Ana","tax_id":"12345678910","secret":"s"}"#;
        let input: NewAccount = serde_json::from_str(json).unwrap();
        assert!(input.id.is_empty());
        assert_eq!(input.balance, 0);
    }
}
