pub use memory::InMemoryStore;
pub use mock::MockStore;
pub use models::{Account, Currency, User};
pub use postgres::PostgresStore;
pub use store::{CreateAccountParams, CreateUserParams, ListAccountsParams, Store, StoreError};

pub mod memory;
pub mod mock;
pub mod models;
pub mod postgres;
pub mod store;
