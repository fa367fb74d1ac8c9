//! Transfer validation strategy

use tracing::warn;

use super::models::Transfer;
use crate::errors::BankError;
use crate::validation::ValidationStrategy;

/// Completeness check applied to a transfer record before it is stored
#[derive(Debug, Default, Clone, Copy)]
pub struct TransferCreationRules;

impl ValidationStrategy<Transfer> for TransferCreationRules {
    fn validate(&self, transfer: &Transfer) -> Result<(), BankError> {
        let result = if transfer.id.is_empty() {
            Err(BankError::MissingIdentity)
        } else if transfer.account_origin_id.is_empty() || transfer.account_destination_id.is_empty() {
            Err(BankError::MissingData)
        } else if transfer.account_origin_id == transfer.account_destination_id {
            Err(BankError::SameAccountTransfer)
        } else if transfer.amount <= 0 {
            Err(BankError::MissingAmount)
        } else {
            Ok(())
        };

        if let Err(ref e) = result {
            warn!(transfer_id = %transfer.id, error = %e, "transfer record rejected");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{AccountId, TransferId};

    fn valid() -> Transfer {
        Transfer::pending(TransferId::generate(), AccountId::generate(), AccountId::generate(), 10)
    }

    #[test]
    fn test_valid_transfer() {
        assert!(TransferCreationRules.validate(&valid()).is_ok());
    }

    #[test]
    fn test_rejections() {
        let rules = TransferCreationRules;

        let mut t = valid();
        t.id = TransferId::default();
        assert_eq!(rules.validate(&t), Err(BankError::MissingIdentity));

        let mut t = valid();
        t.account_destination_id = AccountId::default();
        assert_eq!(rules.validate(&t), Err(BankError::MissingData));

        let mut t = valid();
        t.account_destination_id = t.account_origin_id.clone();
        assert_eq!(rules.validate(&t), Err(BankError::SameAccountTransfer));

        let mut t = valid();
        t.amount = 0;
        assert_eq!(rules.validate(&t), Err(BankError::MissingAmount));
    }
}
