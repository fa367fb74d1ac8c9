//! bankd - Bank Accounts and Transactional Transfers
//!
//! Accounts hold an integer balance in cents. A transfer debits one account
//! and credits another inside a single storage scope: either both balance
//! writes and the transfer record become visible, or none of them do.
//!
//! # Modules
//!
//! - [`core_types`] - Identifiers and the `Cents` money type
//! - [`errors`] - `BankError` taxonomy and `ConfigError`
//! - [`validation`] - Validation strategy capability and field checks
//! - [`persistence`] - Storage backends (memory, PostgreSQL) and transaction scopes
//! - [`account`] - Account model, store capability and `AccountService`
//! - [`access`] - Credentials, secret hashing, session tokens and `AccessService`
//! - [`transfer`] - Transfer model, store capability and `TransferEngine`
//! - [`registry`] - Explicit wiring of services over one backend
//! - [`gateway`] - HTTP/JSON surface (axum)
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

// Core types - must be first!
pub mod core_types;
pub mod errors;
pub mod validation;

// Storage
pub mod db;
pub mod persistence;

// Domain services
pub mod access;
pub mod account;
pub mod registry;
pub mod transfer;

// Runtime
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{AccountId, Cents, TransferId};
pub use errors::{BankError, ConfigError};
pub use persistence::{MemoryBackend, PgBackend, StorageBackend, TransactionScope};
pub use registry::ServiceRegistry;

pub use access::{AccessService, AccountDescription, Argon2Hasher, Credential, TokenIssuer};
pub use account::{Account, AccountService, NewAccount};
pub use transfer::{Transfer, TransferEngine};
