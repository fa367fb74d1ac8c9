//! Transfers between accounts
//!
//! # Flow
//!
//! ```text
//! TransferEngine::transfer
//!   └─ StorageBackend::begin ─► TransactionScope
//!        ├─ lock_accounts(origin, destination)   canonical order
//!        ├─ AccountStore (scoped): read ×2, write ×2
//!        ├─ TransferStore (scoped): write ×1
//!        └─ commit | rollback
//! ```
//!
//! # Invariants
//!
//! 1. **Conservation**: a committed transfer leaves the sum of both balances unchanged
//! 2. **No overdraft**: no committed state has a negative balance
//! 3. **All or nothing**: a failed transfer leaves balances and records as they were

pub mod engine;
pub mod models;
pub mod repository;
pub mod validation;

pub use engine::{DEFAULT_TRANSFER_TIMEOUT, TransferEngine, TransferEngineBuilder};
pub use models::{Transfer, TransferInput};
pub use repository::TransferStore;
pub use validation::TransferCreationRules;
