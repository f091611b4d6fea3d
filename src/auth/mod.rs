use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use crate::shared::{AppError, AppState, UNAUTHORIZED_MESSAGE};
use crate::token::{Maker, Payload};

const BEARER_PREFIX: &str = "Bearer ";
const INVALID_FORMAT_MESSAGE: &str = "invalid authorization header format";

/// Verifies the bearer token carried in the request headers.
///
/// Shared by the REST extractor and the RPC dispatcher so both transports
/// reject the same requests with the same message.
pub fn authenticate(maker: &dyn Maker, headers: &HeaderMap) -> Result<Payload, AppError> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        warn!("Missing authorization header in request");
        AppError::Unauthorized("authorization header is not provided".to_string())
    })?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            warn!("Invalid authorization header format (expected Bearer token)");
            AppError::Unauthorized(INVALID_FORMAT_MESSAGE.to_string())
        })?;

    let payload = maker.verify_token(token.trim()).map_err(|e| {
        warn!(error = %e, "Access token rejected");
        AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    })?;

    debug!(username = %payload.username, token_id = %payload.id, "Request authenticated");
    Ok(payload)
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Handlers take `Result<AuthPayload, AppError>` and unwrap it only after
/// their own input validation, so malformed requests are rejected before
/// credentials are looked at.
#[derive(Debug, Clone)]
pub struct AuthPayload(pub Payload);

#[async_trait]
impl FromRequestParts<AppState> for AuthPayload {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(state.token_maker.as_ref(), &parts.headers).map(AuthPayload)
    }
}
