use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Account, CreateAccountRequest, TransferRequest};
use crate::web::envelope::{ApiError, JsonBody, PathParam};
use crate::web::routes::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub deleted: i32,
}

pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.accounts.get_accounts().await?;
    Ok(Json(accounts))
}

pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    let account = state.accounts.create_account(payload).await?;
    // The row is stored by now; a signing failure is only logged.
    match state.tokens.issue_token(&account) {
        Ok(_) => debug!(id = account.id, number = account.number, "issued account token"),
        Err(e) => warn!(id = account.id, number = account.number, error = %e, "could not issue account token"),
    }
    Ok(Json(account))
}

/// The auth middleware has already loaded and authorized the account.
pub async fn get_account_by_id(Extension(account): Extension<Account>) -> Json<Account> {
    Json(account)
}

pub async fn delete_account(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    state.accounts.delete_account(id).await?;
    Ok(Json(DeleteAccountResponse { deleted: id }))
}

/// Echoes the decoded transfer. No balances are moved.
pub async fn transfer(
    PathParam(account_number): PathParam,
    JsonBody(payload): JsonBody<TransferRequest>,
) -> Json<TransferRequest> {
    info!(
        from = %account_number,
        to = payload.to_account,
        amount = %payload.amount,
        "transfer requested"
    );
    Json(payload)
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}
