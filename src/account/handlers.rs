use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AccountService,
    types::{parse_account_id, parse_currency, CreateAccountRequest, ListAccountsRequest},
};
use crate::auth::AuthPayload;
use crate::db::Account;
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> AccountService {
    AccountService::new(Arc::clone(&state.store), state.config.store_timeout)
}

/// HTTP handler for opening an account owned by the caller
///
/// POST /accounts
#[instrument(name = "create_account", skip_all)]
pub async fn create_account(
    State(state): State<AppState>,
    auth: Result<AuthPayload, AppError>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let currency = parse_currency(&request.currency)?;
    let AuthPayload(payload) = auth?;

    info!(owner = %payload.username, currency = %currency, "Creating account");

    let account = service(&state)
        .create_account(&payload.username, currency)
        .await?;
    Ok(Json(account))
}

/// HTTP handler for fetching a single account
///
/// GET /accounts/:id
#[instrument(name = "get_account", skip(state, auth))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    auth: Result<AuthPayload, AppError>,
) -> Result<Json<Account>, AppError> {
    let id = parse_account_id(&raw_id)?;
    let AuthPayload(payload) = auth?;

    info!(account_id = id, username = %payload.username, "Fetching account");

    let account = service(&state).get_account(id).await?;
    Ok(Json(account))
}

/// HTTP handler for listing the caller's accounts
///
/// GET /accounts?page_id=&page_size=
#[instrument(name = "list_accounts", skip_all)]
pub async fn list_accounts(
    State(state): State<AppState>,
    query: Result<Query<ListAccountsRequest>, QueryRejection>,
    auth: Result<AuthPayload, AppError>,
) -> Result<Json<Vec<Account>>, AppError> {
    let Query(request) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = request.page()?;
    let AuthPayload(payload) = auth?;

    let accounts = service(&state)
        .list_accounts(&payload.username, page)
        .await?;

    info!(owner = %payload.username, account_count = accounts.len(), "Accounts listed");
    Ok(Json(accounts))
}
