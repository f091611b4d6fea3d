use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::config::Config;
use crate::db::{Store, StoreError};
use crate::token::{Maker, TokenError};

/// Message returned for every authentication failure, whatever the cause
pub const UNAUTHORIZED_MESSAGE: &str = "invalid or expired access token";
/// Message returned for every server-side failure
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub token_maker: Arc<dyn Maker>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, token_maker: Arc<dyn Maker>) -> Self {
        Self {
            store,
            token_maker,
            config: Arc::new(config),
        }
    }
}

/// Transport-neutral request outcome for every failure a handler can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Internal => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("record not found".to_string()),
            StoreError::UniqueViolation(constraint) => {
                warn!(constraint = %constraint, "Unique constraint violated");
                AppError::Forbidden("record already exists".to_string())
            }
            StoreError::ForeignKeyViolation(constraint) => {
                warn!(constraint = %constraint, "Foreign key constraint violated");
                AppError::Forbidden("referenced record does not exist".to_string())
            }
            StoreError::Connection(_) | StoreError::Database(_) => {
                error!(error = %err, "Store operation failed");
                AppError::Internal
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid {}", field),
                })
            })
            .collect();
        messages.sort();
        AppError::BadRequest(messages.join("; "))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken | TokenError::ExpiredToken => {
                warn!(error = %err, "Token verification failed");
                AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
            }
            TokenError::InvalidKeySize { .. }
            | TokenError::InvalidDuration
            | TokenError::Encoding(_) => {
                error!(error = %err, "Token maker failure");
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.public_message()
        }));

        (self.status_code(), body).into_response()
    }
}

/// Runs a store operation under a deadline, mapping its failure into an `AppError`
pub async fn bounded<T, F>(deadline: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            error!(operation, timeout_ms = deadline.as_millis() as u64, "Store operation timed out");
            Err(AppError::Internal)
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::db::MockStore;
    use crate::token::SymmetricMaker;
    use crate::util::random::random_string;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        store: Option<Arc<dyn Store>>,
        token_maker: Option<Arc<dyn Maker>>,
        config: Config,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            let mut config = Config::with_symmetric_key(random_string(32));
            config.password_hash_cost = 4; // bcrypt minimum
            Self {
                store: None,
                token_maker: None,
                config,
            }
        }

        pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
            self.store = Some(store);
            self
        }

        pub fn with_token_maker(mut self, token_maker: Arc<dyn Maker>) -> Self {
            self.token_maker = Some(token_maker);
            self
        }

        pub fn build(self) -> AppState {
            let token_maker = match self.token_maker {
                Some(maker) => maker,
                None => Arc::new(
                    SymmetricMaker::new(&self.config.token_symmetric_key)
                        .expect("test key has the right size"),
                ),
            };
            AppState::new(
                self.config,
                self.store.unwrap_or_else(|| Arc::new(MockStore::new())),
                token_maker,
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
