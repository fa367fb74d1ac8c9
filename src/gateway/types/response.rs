//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response with HTTP status
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::BankError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Handler result: status plus envelope on success, `ApiError` otherwise
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with `data`
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with `data`
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

impl From<BankError> for ApiError {
    fn from(e: BankError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() && e != BankError::Timeout {
            tracing::error!(error = %e, code = e.code(), "request failed");
            return Self::new(status, error_codes::INTERNAL_ERROR, "internal error");
        }
        Self::new(status, error_codes::for_bank_error(&e), e.to_string())
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    use crate::errors::BankError;

    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const SAME_ACCOUNT: i32 = 1003;
    pub const MISSING_AMOUNT: i32 = 1004;
    pub const MISSING_DATA: i32 = 1005;
    pub const AMOUNT_OVERFLOW: i32 = 1006;
    pub const MISSING_IDENTITY: i32 = 1007;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const INVALID_CREDENTIALS: i32 = 2003;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const TRANSFER_NOT_FOUND: i32 = 4002;
    pub const ORIGIN_NOT_FOUND: i32 = 4003;
    pub const DESTINATION_NOT_FOUND: i32 = 4004;
    pub const DUPLICATE_IDENTITY: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const TIMEOUT: i32 = 5003;

    pub fn for_bank_error(e: &BankError) -> i32 {
        match e {
            BankError::MissingIdentity => MISSING_IDENTITY,
            BankError::DuplicateIdentity => DUPLICATE_IDENTITY,
            BankError::AccountNotFound => ACCOUNT_NOT_FOUND,
            BankError::TransferNotFound => TRANSFER_NOT_FOUND,
            BankError::InvalidCredentials => INVALID_CREDENTIALS,
            BankError::InsufficientBalance => INSUFFICIENT_BALANCE,
            BankError::SameAccountTransfer => SAME_ACCOUNT,
            BankError::MissingAmount => MISSING_AMOUNT,
            BankError::MissingData => MISSING_DATA,
            BankError::OriginNotFound => ORIGIN_NOT_FOUND,
            BankError::DestinationNotFound => DESTINATION_NOT_FOUND,
            BankError::AmountOverflow => AMOUNT_OVERFLOW,
            BankError::Validation(_) => INVALID_PARAMETER,
            BankError::Timeout => TIMEOUT,
            BankError::ScopeClosed
            | BankError::Storage(_)
            | BankError::Hashing(_)
            | BankError::Token(_) => INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_error_envelope_has_no_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(1002, "nope")).unwrap();
        assert_eq!(json["code"], 1002);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_bank_error_mapping() {
        let e = ApiError::from(BankError::InsufficientBalance);
        assert_eq!(e.status, StatusCode::FORBIDDEN);
        assert_eq!(e.code, error_codes::INSUFFICIENT_BALANCE);

        let e = ApiError::from(BankError::Validation(ValidationError::Required { field: "name" }));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, error_codes::INVALID_PARAMETER);
        assert!(e.msg.contains("name"));

        let e = ApiError::from(BankError::Timeout);
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.code, error_codes::TIMEOUT);
    }

    #[test]
    fn test_internal_details_hidden() {
        let e = ApiError::from(BankError::Storage("password=hunter2".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.msg, "internal error");
    }
}
