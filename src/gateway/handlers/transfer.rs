//! Transfer handlers (session account is always the origin)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::access::Claims;
use crate::core_types::TransferId;
use crate::errors::BankError;
use crate::transfer::{Transfer, TransferInput};

/// Create transfer
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferInput,
    responses(
        (status = 201, description = "Transfer committed", body = Transfer, content_type = "application/json"),
        (status = 400, description = "Missing amount or data"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Insufficient balance or same account"),
        (status = 404, description = "Origin or destination not found"),
        (status = 503, description = "Transfer timed out")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<TransferInput>,
) -> ApiResult<Transfer> {
    let transfer = state
        .services
        .transfers
        .transfer(&claims.account_id(), &input.account_destination_id, input.amount)
        .await?;
    created(transfer)
}

/// List transfers of the session account
///
/// GET /api/v1/transfers
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    responses(
        (status = 200, description = "Transfers as origin or destination", body = [Transfer], content_type = "application/json"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Vec<Transfer>> {
    ok(state
        .services
        .transfers
        .list_transfers_from_account(&claims.account_id())
        .await)
}

/// Get one transfer the session account took part in
///
/// GET /api/v1/transfers/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = String, Path, description = "Transfer id (ULID)")),
    responses(
        (status = 200, description = "Transfer", body = Transfer, content_type = "application/json"),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "Transfer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<Transfer> {
    let id: TransferId = id.parse().map_err(|_| BankError::TransferNotFound)?;
    let transfer = state.services.transfers.get_transfer(&id).await?;
    // Other accounts' transfers are reported as missing
    if !transfer.involves(&claims.account_id()) {
        return Err(BankError::TransferNotFound.into());
    }
    ok(transfer)
}
