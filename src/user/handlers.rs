use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{CreateUserRequest, LoginUserRequest, LoginUserResponse, UserResponse},
};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.token_maker),
        Arc::clone(&state.config),
    )
}

/// HTTP handler for registering a user
///
/// POST /users
#[instrument(name = "create_user", skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    info!(username = %request.username, "Creating user");

    let user = service(&state).create_user(request).await?;
    Ok(Json(user))
}

/// HTTP handler for logging in
///
/// POST /users/login
/// Returns an access token valid for the configured duration
#[instrument(name = "login_user", skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    body: Result<Json<LoginUserRequest>, JsonRejection>,
) -> Result<Json<LoginUserResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    info!(username = %request.username, "Logging in user");

    let response = service(&state).login_user(request).await?;
    Ok(Json(response))
}
