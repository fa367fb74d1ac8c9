//! Validation strategy capability
//!
//! Services receive their strategies at construction time and run them
//! before any mutation is accepted. Field helpers shared by the concrete
//! strategies live here as well.

use crate::errors::{BankError, ValidationError};

/// A swappable predicate set applied to an entity before it is persisted
pub trait ValidationStrategy<T: ?Sized>: Send + Sync {
    fn validate(&self, entity: &T) -> Result<(), BankError>;
}

/// Length of a national tax identifier
pub const TAX_ID_LEN: usize = 11;

/// Check a tax identifier: exactly 11 ASCII digits
pub fn check_tax_id(tax_id: &str) -> Result<(), ValidationError> {
    if tax_id.is_empty() {
        return Err(ValidationError::Required { field: "tax_id" });
    }
    if tax_id.len() != TAX_ID_LEN {
        return Err(ValidationError::InvalidLength {
            field: "tax_id",
            expected: TAX_ID_LEN,
            actual: tax_id.chars().count(),
        });
    }
    if !tax_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "tax_id",
            expected: "digits only",
        });
    }
    Ok(())
}

/// Check that a plain-text secret was supplied
pub fn check_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::Required { field: "secret" });
    }
    Ok(())
}

/// Check a balance is not negative
pub fn check_balance(balance: i64) -> Result<(), ValidationError> {
    if balance < 0 {
        return Err(ValidationError::Negative {
            field: "balance",
            value: balance,
        });
    }
    Ok(())
}
