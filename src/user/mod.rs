// Public API - what other modules can use
pub use handlers::{create_user, login_user};
pub use service::UserService;
pub use types::{CreateUserRequest, LoginUserRequest, LoginUserResponse, UserResponse};

mod handlers;
mod password;
pub mod service;
pub mod types;
