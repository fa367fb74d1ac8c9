//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: Response envelope, `ApiError` and error codes

pub mod response;

pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
