//! HTTP handlers, grouped by resource

pub mod account;
pub mod auth;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account, get_balance, list_accounts};
pub use auth::{LoginResponse, login};
pub use health::{HealthResponse, health_check};
pub use transfer::{create_transfer, get_transfer, list_transfers};

