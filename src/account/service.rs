use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use super::types::Page;
use crate::db::{Account, CreateAccountParams, Currency, ListAccountsParams, Store};
use crate::shared::{bounded, AppError};

/// Account operations shared by the REST and RPC transports.
///
/// Inputs are expected to be validated already; this layer only talks to
/// the store and maps its failures.
pub struct AccountService {
    store: Arc<dyn Store>,
    store_timeout: Duration,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, id: i64) -> Result<Account, AppError> {
        bounded(self.store_timeout, "get_account", self.store.get_account(id)).await
    }

    #[instrument(skip(self))]
    pub async fn create_account(&self, owner: &str, currency: Currency) -> Result<Account, AppError> {
        let params = CreateAccountParams {
            owner: owner.to_string(),
            balance: 0,
            currency: currency.to_string(),
        };
        let account = bounded(
            self.store_timeout,
            "create_account",
            self.store.create_account(params),
        )
        .await?;

        info!(account_id = account.id, owner = %account.owner, "Account created");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(&self, owner: &str, page: Page) -> Result<Vec<Account>, AppError> {
        let params = ListAccountsParams {
            owner: owner.to_string(),
            limit: page.limit,
            offset: page.offset,
        };
        bounded(
            self.store_timeout,
            "list_accounts",
            self.store.list_accounts(params),
        )
        .await
    }
}
