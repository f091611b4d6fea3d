// Public API - what other modules can use
pub use handlers::{create_account, get_account, list_accounts};
pub use service::AccountService;
pub use types::{CreateAccountRequest, GetAccountRequest, ListAccountsRequest};

mod handlers;
pub mod service;
pub mod types;
