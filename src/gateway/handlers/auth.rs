//! Login handler

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::access::{AccountDescription, Credential};

/// Login response: bearer token plus the authenticated identity
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub account: AccountDescription,
}

/// Authenticate with tax id and secret
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = Credential,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Malformed credential"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<Credential>,
) -> ApiResult<LoginResponse> {
    let account = state.services.access.authenticate(&credential).await?;
    let token = state.tokens.issue(&account)?;
    ok(LoginResponse { token, account })
}
