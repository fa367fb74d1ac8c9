//! Account handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::account::{Account, BalanceView, NewAccount};
use crate::core_types::AccountId;

/// Create account
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid account data"),
        (status = 409, description = "Tax id already registered")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewAccount>,
) -> ApiResult<Account> {
    let account = state.services.accounts.create_account(input).await?;
    created(account)
}

/// List accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "All accounts, insertion order", body = [Account], content_type = "application/json")
    ),
    tag = "Account"
)]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Account>> {
    ok(state.services.accounts.list_accounts().await?)
}

/// Get account
///
/// GET /api/v1/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = Account, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Account> {
    ok(state.services.accounts.get_account(&AccountId::from(id)).await?)
}

/// Get account balance
///
/// GET /api/v1/accounts/{id}/balance
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/balance",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Balance in cents", body = BalanceView, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<BalanceView> {
    let balance = state
        .services
        .accounts
        .account_balance(&AccountId::from(id))
        .await?;
    ok(BalanceView { balance })
}
