use async_trait::async_trait;
use thiserror::Error;

use super::models::{Account, User};

/// Failures a store implementation may report.
///
/// Handlers rely on `NotFound` being distinct from every infrastructure
/// failure, so implementations must never fold a missing row into
/// `Connection` or `Database` (or the reverse).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAccountsParams {
    pub owner: String,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserParams {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
}

/// Persistence operations consumed by the request handlers.
///
/// Every call is a future bound to the request that issued it; dropping the
/// future abandons the operation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_account(&self, id: i64) -> Result<Account, StoreError>;
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError>;
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError>;
    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError>;
    async fn get_user(&self, username: &str) -> Result<User, StoreError>;
}
