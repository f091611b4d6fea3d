use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::messages::{RpcMethod, RpcRequest, RpcResponse};
use crate::account::{
    types::{parse_currency, validate_account_id},
    AccountService, CreateAccountRequest, GetAccountRequest, ListAccountsRequest,
};
use crate::auth::authenticate;
use crate::shared::{AppError, AppState};
use crate::user::{CreateUserRequest, LoginUserRequest, UserService};

/// RPC entry point
///
/// POST /rpc
/// Always answers 200 at the HTTP level; the outcome is carried in `code`.
#[instrument(name = "rpc", skip_all)]
pub async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed RPC envelope");
            return Json(RpcResponse::error(&AppError::BadRequest(
                rejection.body_text(),
            )));
        }
    };

    let method = request.method;
    info!(?method, "Dispatching RPC call");

    match dispatch(&state, &headers, request).await {
        Ok(payload) => Json(RpcResponse::ok(payload)),
        Err(err) => {
            warn!(?method, error = %err, "RPC call failed");
            Json(RpcResponse::error(&err))
        }
    }
}

fn decode<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "Failed to encode RPC response");
        AppError::Internal
    })
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    request: RpcRequest,
) -> Result<serde_json::Value, AppError> {
    let accounts = AccountService::new(Arc::clone(&state.store), state.config.store_timeout);
    let users = UserService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.token_maker),
        Arc::clone(&state.config),
    );
    let maker = state.token_maker.as_ref();

    match request.method {
        RpcMethod::CreateUser => {
            let request: CreateUserRequest = decode(request.payload)?;
            encode(users.create_user(request).await?)
        }
        RpcMethod::LoginUser => {
            let request: LoginUserRequest = decode(request.payload)?;
            encode(users.login_user(request).await?)
        }
        RpcMethod::CreateAccount => {
            let request: CreateAccountRequest = decode(request.payload)?;
            let currency = parse_currency(&request.currency)?;
            let payload = authenticate(maker, headers)?;
            encode(accounts.create_account(&payload.username, currency).await?)
        }
        RpcMethod::GetAccount => {
            let request: GetAccountRequest = decode(request.payload)?;
            let id = validate_account_id(request.id)?;
            authenticate(maker, headers)?;
            encode(accounts.get_account(id).await?)
        }
        RpcMethod::ListAccounts => {
            let request: ListAccountsRequest = decode(request.payload)?;
            let page = request.page()?;
            let payload = authenticate(maker, headers)?;
            encode(accounts.list_accounts(&payload.username, page).await?)
        }
    }
}
