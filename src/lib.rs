// Library crate for the simple bank server
// This file exposes the public API for integration tests

pub mod account;
pub mod auth;
pub mod config;
pub mod db;
pub mod rpc;
pub mod server;
pub mod shared;
pub mod token;
pub mod user;
pub mod util;

// Re-export commonly used types for easier access in tests
pub use config::{Config, TokenKind};
pub use db::{Account, InMemoryStore, MockStore, Store, StoreError};
pub use server::{Server, ServerError};
pub use shared::{AppError, AppState};
pub use token::{JwtMaker, Maker, Payload, SymmetricMaker, TokenError};
