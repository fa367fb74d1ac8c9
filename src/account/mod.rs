//! Accounts: model, store capability, validation and service

pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use models::{Account, BalanceView, NewAccount};
pub use repository::AccountStore;
pub use service::{AccountService, AccountServiceBuilder, DEFAULT_LOCK_TIMEOUT};
pub use validation::{AccountCreationRules, BalanceUpdateRules};
