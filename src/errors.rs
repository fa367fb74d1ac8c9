//! Domain error types
//!
//! One closed enumeration for every failure the core can report. The gateway
//! maps each kind to an HTTP status and a stable code; nothing downstream
//! inspects error strings.

use thiserror::Error;

/// Field-level validation failures produced by the validation strategies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid format for {field} (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// Banking domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    // === Identity ===
    #[error("Entity has no unique identity")]
    MissingIdentity,

    #[error("Entity identity already exists")]
    DuplicateIdentity,

    // === Lookup ===
    #[error("Account not found")]
    AccountNotFound,

    #[error("Transfer not found")]
    TransferNotFound,

    // === Access ===
    #[error("Invalid access credentials")]
    InvalidCredentials,

    // === Transfer rules ===
    #[error("Transfer not allowed: the origin account has insufficient balance")]
    InsufficientBalance,

    #[error("Transfer not allowed: transfer between the same account")]
    SameAccountTransfer,

    #[error("Transfer not allowed: missing amount")]
    MissingAmount,

    #[error("Transfer not allowed: missing data")]
    MissingData,

    #[error("Transfer not allowed: origin account not found")]
    OriginNotFound,

    #[error("Transfer not allowed: destination account not found")]
    DestinationNotFound,

    #[error("Amount would overflow the destination balance")]
    AmountOverflow,

    // === Validation ===
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // === System ===
    #[error("Transaction scope already closed")]
    ScopeClosed,

    #[error("Operation timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Secret hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl BankError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            BankError::MissingIdentity => "MISSING_IDENTITY",
            BankError::DuplicateIdentity => "DUPLICATE_IDENTITY",
            BankError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            BankError::TransferNotFound => "TRANSFER_NOT_FOUND",
            BankError::InvalidCredentials => "INVALID_CREDENTIALS",
            BankError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            BankError::SameAccountTransfer => "SAME_ACCOUNT_TRANSFER",
            BankError::MissingAmount => "MISSING_AMOUNT",
            BankError::MissingData => "MISSING_DATA",
            BankError::OriginNotFound => "ORIGIN_NOT_FOUND",
            BankError::DestinationNotFound => "DESTINATION_NOT_FOUND",
            BankError::AmountOverflow => "AMOUNT_OVERFLOW",
            BankError::Validation(_) => "VALIDATION_FAILED",
            BankError::ScopeClosed => "SCOPE_CLOSED",
            BankError::Timeout => "TIMEOUT",
            BankError::Storage(_) => "STORAGE_ERROR",
            BankError::Hashing(_) => "HASHING_ERROR",
            BankError::Token(_) => "TOKEN_ERROR",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            BankError::MissingIdentity
            | BankError::MissingAmount
            | BankError::MissingData
            | BankError::AmountOverflow
            | BankError::Validation(_) => 400,
            BankError::InvalidCredentials => 401,
            BankError::InsufficientBalance | BankError::SameAccountTransfer => 403,
            BankError::AccountNotFound
            | BankError::TransferNotFound
            | BankError::OriginNotFound
            | BankError::DestinationNotFound => 404,
            BankError::DuplicateIdentity => 409,
            BankError::Timeout => 503,
            BankError::ScopeClosed
            | BankError::Storage(_)
            | BankError::Hashing(_)
            | BankError::Token(_) => 500,
        }
    }
}

impl From<sqlx::Error> for BankError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                BankError::DuplicateIdentity
            }
            _ => BankError::Storage(e.to_string()),
        }
    }
}

/// Wiring errors detected while assembling services at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{component}: required collaborator '{collaborator}' is not defined")]
    MissingCollaborator {
        component: &'static str,
        collaborator: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn missing(component: &'static str, collaborator: &'static str) -> Self {
        ConfigError::MissingCollaborator {
            component,
            collaborator,
        }
    }
}
