use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::models::{Account, User};
use super::store::{CreateAccountParams, CreateUserParams, ListAccountsParams, Store, StoreError};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL implementation of Store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation(constraint),
                    Some(FOREIGN_KEY_VIOLATION) => StoreError::ForeignKeyViolation(constraint),
                    _ => StoreError::Database(db_err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}

#[async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self))]
    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        debug!(account_id = id, "Fetching account from database");

        sqlx::query_as::<_, Account>(
            "SELECT id, owner, balance, currency FROM accounts WHERE id = $1 LIMIT 1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = StoreError::from(e);
            if err != StoreError::NotFound {
                warn!(error = %err, account_id = id, "Failed to fetch account from database");
            }
            err
        })
    }

    #[instrument(skip(self, params), fields(owner = %params.owner))]
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError> {
        debug!(currency = %params.currency, "Creating account in database");

        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (owner, balance, currency) VALUES ($1, $2, $3) \
             RETURNING id, owner, balance, currency",
        )
        .bind(&params.owner)
        .bind(params.balance)
        .bind(&params.currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create account in database");
            StoreError::from(e)
        })
    }

    #[instrument(skip(self, params), fields(owner = %params.owner))]
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        debug!(limit = params.limit, offset = params.offset, "Listing accounts from database");

        sqlx::query_as::<_, Account>(
            "SELECT id, owner, balance, currency FROM accounts WHERE owner = $1 \
             ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(&params.owner)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list accounts from database");
            StoreError::from(e)
        })
    }

    #[instrument(skip(self, params), fields(username = %params.username))]
    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError> {
        debug!("Creating user in database");

        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, hashed_password, full_name, email) VALUES ($1, $2, $3, $4) \
             RETURNING username, hashed_password, full_name, email, password_changed_at, created_at",
        )
        .bind(&params.username)
        .bind(&params.hashed_password)
        .bind(&params.full_name)
        .bind(&params.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            StoreError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        debug!("Fetching user from database");

        sqlx::query_as::<_, User>(
            "SELECT username, hashed_password, full_name, email, password_changed_at, created_at \
             FROM users WHERE username = $1 LIMIT 1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }
}
