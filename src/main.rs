use simplebank::{
    db::{InMemoryStore, PostgresStore, Store},
    Config, Server,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simplebank=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting simple bank server");

    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(config.store_timeout)
                .connect(url)
                .await?;
            info!("Connected to PostgreSQL");
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let server = Server::new(config, store)?;
    let listener = tokio::net::TcpListener::bind(server.config().http_server_address.as_str()).await?;
    server.serve(listener).await?;

    Ok(())
}
