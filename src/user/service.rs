use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::{
    password::{check_password, hash_password},
    types::{CreateUserRequest, LoginUserRequest, LoginUserResponse, UserResponse},
};
use crate::config::Config;
use crate::db::{CreateUserParams, Store};
use crate::shared::{bounded, AppError};
use crate::token::Maker;

/// Service for user registration and login
pub struct UserService {
    store: Arc<dyn Store>,
    token_maker: Arc<dyn Maker>,
    config: Arc<Config>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, token_maker: Arc<dyn Maker>, config: Arc<Config>) -> Self {
        Self {
            store,
            token_maker,
            config,
        }
    }

    /// Registers a new user after validating the request
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        let hashed_password =
            hash_password(request.password, self.config.password_hash_cost).await?;
        let params = CreateUserParams {
            username: request.username,
            hashed_password,
            full_name: request.full_name,
            email: request.email,
        };

        let user = bounded(
            self.config.store_timeout,
            "create_user",
            self.store.create_user(params),
        )
        .await?;

        info!(username = %user.username, "User created");
        Ok(user.into())
    }

    /// Checks credentials and issues an access token
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn login_user(&self, request: LoginUserRequest) -> Result<LoginUserResponse, AppError> {
        request.validate()?;

        let user = bounded(
            self.config.store_timeout,
            "get_user",
            self.store.get_user(&request.username),
        )
        .await?;

        if !check_password(request.password, user.hashed_password.clone()).await? {
            warn!(username = %user.username, "Login rejected: incorrect password");
            return Err(AppError::Unauthorized("incorrect username or password".to_string()));
        }

        let (access_token, payload) = self
            .token_maker
            .create_token(&user.username, self.config.access_token_duration)?;

        info!(
            username = %user.username,
            token_id = %payload.id,
            expires_at = %payload.expired_at,
            "User logged in"
        );

        Ok(LoginUserResponse {
            access_token,
            access_token_expires_at: payload.expired_at,
            user: user.into(),
        })
    }
}
