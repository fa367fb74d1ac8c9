//! Access credential and public account identity

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::account::Account;
use crate::core_types::AccountId;
use crate::errors::BankError;
use crate::validation::{ValidationStrategy, check_secret, check_tax_id};

/// Login input
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credential {
    #[schema(example = "12345678910")]
    pub tax_id: String,
    #[schema(example = "a secret")]
    pub secret: String,
}

/// Public identity of an authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountDescription {
    pub account_id: AccountId,
    #[schema(example = "12345678910")]
    pub tax_id: String,
    #[schema(example = "Jon Due")]
    pub name: String,
}

impl From<&Account> for AccountDescription {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            tax_id: account.tax_id.clone(),
            name: account.name.clone(),
        }
    }
}

/// Credential shape check: 11-digit tax id and a non-empty secret
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialRules;

impl ValidationStrategy<Credential> for CredentialRules {
    fn validate(&self, credential: &Credential) -> Result<(), BankError> {
        check_tax_id(&credential.tax_id)
            .and_then(|_| check_secret(&credential.secret))
            .map_err(|e| {
                warn!(error = %e, "credential rejected");
                BankError::from(e)
            })
    }
}
