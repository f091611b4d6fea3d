use axum::{
    error_handling::HandleErrorLayer,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::account;
use crate::config::{Config, TokenKind};
use crate::db::Store;
use crate::rpc;
use crate::shared::{AppError, AppState};
use crate::token::{JwtMaker, Maker, SymmetricMaker, TokenError};
use crate::user;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("cannot create token maker: {0}")]
    TokenMaker(#[from] TokenError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves the banking API over REST and RPC from one set of dependencies
pub struct Server {
    state: AppState,
}

impl Server {
    /// Builds the token maker selected by `config` and binds it with `store`.
    ///
    /// Fails without constructing anything if the token key is unusable.
    #[instrument(skip_all, fields(token_kind = %config.token_kind))]
    pub fn new(config: Config, store: Arc<dyn Store>) -> Result<Self, ServerError> {
        let token_maker: Arc<dyn Maker> = match config.token_kind {
            TokenKind::Symmetric => Arc::new(SymmetricMaker::new(&config.token_symmetric_key)?),
            TokenKind::Jwt => Arc::new(JwtMaker::new(&config.token_symmetric_key)?),
        };

        info!("Token maker ready");
        Ok(Self::with_maker(config, store, token_maker))
    }

    pub fn with_maker(config: Config, store: Arc<dyn Store>, token_maker: Arc<dyn Maker>) -> Self {
        Self {
            state: AppState::new(config, store, token_maker),
        }
    }

    pub fn token_maker(&self) -> Arc<dyn Maker> {
        Arc::clone(&self.state.token_maker)
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Routing table for both transports
    pub fn router(&self) -> Router {
        Router::new()
            .route("/users", post(user::create_user))
            .route("/users/login", post(user::login_user))
            .route(
                "/accounts",
                post(account::create_account).get(account::list_accounts),
            )
            .route("/accounts/:id", get(account::get_account))
            .route("/rpc", post(rpc::handle_rpc))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(self.state.config.request_timeout)),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serves requests on `listener` until ctrl-c is received
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let address = listener.local_addr()?;
        info!(%address, "Server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Requests that outlive the deadline are reported as server failures
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        error!("Request timed out");
    } else {
        error!(error = %err, "Unhandled middleware error");
    }
    AppError::Internal
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
