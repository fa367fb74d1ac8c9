//! Account validation strategies

use tracing::warn;

use super::models::{Account, NewAccount};
use crate::errors::{BankError, ValidationError};
use crate::validation::{ValidationStrategy, check_balance, check_secret, check_tax_id};

/// Rules applied before an account is created
///
/// - identifier assigned and a well-formed UUID
/// - name not blank (surrounding whitespace ignored)
/// - tax id of exactly 11 digits
/// - balance not negative
/// - secret not empty
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountCreationRules;

impl ValidationStrategy<NewAccount> for AccountCreationRules {
    fn validate(&self, input: &NewAccount) -> Result<(), BankError> {
        let result = check_creation(input);
        if let Err(ref e) = result {
            warn!(account_id = %input.id, error = %e, "account creation data rejected");
        }
        result
    }
}

fn check_creation(input: &NewAccount) -> Result<(), BankError> {
    if input.id.is_empty() {
        return Err(BankError::MissingIdentity);
    }
    if !input.id.is_well_formed() {
        return Err(ValidationError::InvalidFormat {
            field: "id",
            expected: "uuid",
        }
        .into());
    }
    if input.name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" }.into());
    }
    check_tax_id(&input.tax_id)?;
    check_balance(input.balance)?;
    check_secret(&input.secret)?;
    Ok(())
}

/// Rules applied before a balance overwrite: balance not negative
#[derive(Debug, Default, Clone, Copy)]
pub struct BalanceUpdateRules;

impl ValidationStrategy<Account> for BalanceUpdateRules {
    fn validate(&self, account: &Account) -> Result<(), BankError> {
        check_balance(account.balance).map_err(|e| {
            warn!(account_id = %account.id, error = %e, "balance update rejected");
            BankError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::AccountId;

    fn valid_input() -> NewAccount {
        NewAccount {
            id: AccountId::generate(),
            name: "Jon Due".to_string(),
            tax_id: "00000000003".to_string(),
            secret: "a secret".to_string(),
            balance: 0,
        }
    }

    #[test]
    fn test_creation_valid() {
        assert!(AccountCreationRules.validate(&valid_input()).is_ok());
    }

    #[test]
    fn test_creation_missing_id() {
        let input = NewAccount {
            id: AccountId::default(),
            ..valid_input()
        };
        assert_eq!(
            AccountCreationRules.validate(&input),
            Err(BankError::MissingIdentity)
        );
    }

    #[test]
    fn test_creation_malformed_id() {
        let input = NewAccount {
            id: AccountId::from("42"),
            ..valid_input()
        };
        assert!(matches!(
            AccountCreationRules.validate(&input),
            Err(BankError::Validation(ValidationError::InvalidFormat { field: "id", .. }))
        ));
    }

    #[test]
    fn test_creation_blank_name() {
        let input = NewAccount {
            name: "   \t ".to_string(),
            ..valid_input()
        };
        assert_eq!(
            AccountCreationRules.validate(&input),
            Err(BankError::Validation(ValidationError::Required { field: "name" }))
        );
    }

    #[test]
    fn test_creation_bad_tax_id_balance_secret() {
        let short = NewAccount {
            tax_id: "123".to_string(),
            ..valid_input()
        };
        assert!(AccountCreationRules.validate(&short).is_err());

        let negative = NewAccount {
            balance: -1,
            ..valid_input()
        };
        assert!(matches!(
            AccountCreationRules.validate(&negative),
            Err(BankError::Validation(ValidationError::Negative { .. }))
        ));

        let no_secret = NewAccount {
            secret: String::new(),
            ..valid_input()
        };
        assert_eq!(
            AccountCreationRules.validate(&no_secret),
            Err(BankError::Validation(ValidationError::Required { field: "secret" }))
        );
    }

    #[test]
    fn test_balance_update_rules() {
        let id = AccountId::generate();
        assert!(
            BalanceUpdateRules
                .validate(&Account::with_balance(id.clone(), 0))
                .is_ok()
        );
        assert!(
            BalanceUpdateRules
                .validate(&Account::with_balance(id, -5))
                .is_err()
        );
    }
}
