use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Account, User};
use super::store::{CreateAccountParams, CreateUserParams, ListAccountsParams, Store, StoreError};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    users: HashMap<String, User>,
    next_account_id: i64,
}

/// In-memory implementation of Store for development and testing
///
/// Behaves like the database-backed store from the caller's point of view,
/// including the error taxonomy. Data is lost when the process exits.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_account_id: 1,
                ..Tables::default()
            }),
        }
    }

    /// Creates a store pre-populated with the given accounts, keeping their ids
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let mut tables = Tables {
            next_account_id: 1,
            ..Tables::default()
        };
        for account in accounts {
            tables.next_account_id = tables.next_account_id.max(account.id + 1);
            tables.accounts.insert(account.id, account);
        }

        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    #[instrument(skip(self))]
    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        let tables = self.tables.read().await;
        match tables.accounts.get(&id) {
            Some(account) => {
                debug!(account_id = id, owner = %account.owner, "Account found in memory");
                Ok(account.clone())
            }
            None => {
                debug!(account_id = id, "Account not found in memory");
                Err(StoreError::NotFound)
            }
        }
    }

    #[instrument(skip(self, params), fields(owner = %params.owner))]
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&params.owner) {
            warn!(owner = %params.owner, "Account owner does not exist");
            return Err(StoreError::ForeignKeyViolation(
                "accounts_owner_fkey".to_string(),
            ));
        }
        let duplicate = tables
            .accounts
            .values()
            .any(|a| a.owner == params.owner && a.currency == params.currency);
        if duplicate {
            warn!(owner = %params.owner, currency = %params.currency, "Owner already has an account in this currency");
            return Err(StoreError::UniqueViolation(
                "owner_currency_key".to_string(),
            ));
        }

        let account = Account {
            id: tables.next_account_id,
            owner: params.owner,
            balance: params.balance,
            currency: params.currency,
        };
        tables.next_account_id += 1;
        tables.accounts.insert(account.id, account.clone());

        debug!(account_id = account.id, "Account created in memory");
        Ok(account)
    }

    #[instrument(skip(self, params), fields(owner = %params.owner))]
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.read().await;
        let accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.owner == params.owner)
            .skip(params.offset.max(0) as usize)
            .take(params.limit.max(0) as usize)
            .cloned()
            .collect();

        debug!(count = accounts.len(), "Accounts listed from memory");
        Ok(accounts)
    }

    #[instrument(skip(self, params), fields(username = %params.username))]
    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.contains_key(&params.username) {
            warn!(username = %params.username, "User already exists in memory");
            return Err(StoreError::UniqueViolation("users_pkey".to_string()));
        }
        if tables.users.values().any(|u| u.email == params.email) {
            warn!(username = %params.username, "Email already registered in memory");
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            username: params.username,
            hashed_password: params.hashed_password,
            full_name: params.full_name,
            email: params.email,
            password_changed_at: now,
            created_at: now,
        };
        tables.users.insert(user.username.clone(), user.clone());

        debug!(username = %user.username, "User created in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        let tables = self.tables.read().await;
        tables.users.get(username).cloned().ok_or_else(|| {
            debug!(username = %username, "User not found in memory");
            StoreError::NotFound
        })
    }
}
