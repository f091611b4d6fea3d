use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use super::models::{Account, User};
use super::store::{CreateAccountParams, CreateUserParams, ListAccountsParams, Store, StoreError};

type Responder<A, R> = Box<dyn Fn(&A) -> Result<R, StoreError> + Send + Sync>;

/// One mocked store operation: the scripted response plus every argument it was called with
struct Expectation<A, R> {
    responder: Option<Responder<A, R>>,
    calls: Vec<A>,
}

impl<A: Clone, R> Expectation<A, R> {
    fn new() -> Self {
        Self {
            responder: None,
            calls: Vec::new(),
        }
    }

    fn call(&mut self, arg: A, operation: &str) -> Result<R, StoreError> {
        self.calls.push(arg.clone());
        match &self.responder {
            Some(responder) => responder(&arg),
            None => Err(StoreError::Database(format!(
                "unexpected call to {}",
                operation
            ))),
        }
    }
}

/// Scriptable Store test double
///
/// Each operation answers with the closure registered through its
/// `expect_*` method and records the argument it received, so tests can
/// assert exact call counts and arguments. Calling an operation that was
/// never scripted returns a `StoreError::Database`.
pub struct MockStore {
    get_account: Mutex<Expectation<i64, Account>>,
    create_account: Mutex<Expectation<CreateAccountParams, Account>>,
    list_accounts: Mutex<Expectation<ListAccountsParams, Vec<Account>>>,
    create_user: Mutex<Expectation<CreateUserParams, User>>,
    get_user: Mutex<Expectation<String, User>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! mock_operation {
    ($expect:ident, $calls:ident, $field:ident, $arg:ty, $ret:ty) => {
        pub fn $expect<F>(self, responder: F) -> Self
        where
            F: Fn(&$arg) -> Result<$ret, StoreError> + Send + Sync + 'static,
        {
            self.$field
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .responder = Some(Box::new(responder));
            self
        }

        pub fn $calls(&self) -> Vec<$arg> {
            self.$field
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .calls
                .clone()
        }
    };
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            get_account: Mutex::new(Expectation::new()),
            create_account: Mutex::new(Expectation::new()),
            list_accounts: Mutex::new(Expectation::new()),
            create_user: Mutex::new(Expectation::new()),
            get_user: Mutex::new(Expectation::new()),
        }
    }

    mock_operation!(expect_get_account, get_account_calls, get_account, i64, Account);
    mock_operation!(
        expect_create_account,
        create_account_calls,
        create_account,
        CreateAccountParams,
        Account
    );
    mock_operation!(
        expect_list_accounts,
        list_accounts_calls,
        list_accounts,
        ListAccountsParams,
        Vec<Account>
    );
    mock_operation!(
        expect_create_user,
        create_user_calls,
        create_user,
        CreateUserParams,
        User
    );
    mock_operation!(expect_get_user, get_user_calls, get_user, String, User);

    /// Total number of store calls across all operations
    pub fn total_calls(&self) -> usize {
        self.get_account_calls().len()
            + self.create_account_calls().len()
            + self.list_accounts_calls().len()
            + self.create_user_calls().len()
            + self.get_user_calls().len()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        self.get_account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(id, "get_account")
    }

    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError> {
        self.create_account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(params, "create_account")
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        self.list_accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(params, "list_accounts")
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError> {
        self.create_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(params, "create_user")
    }

    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        self.get_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .call(username.to_string(), "get_user")
    }
}
