use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::User;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 3, max = 32, message = "username must contain 3-32 characters"),
        regex(
            path = *USERNAME_PATTERN,
            message = "username must contain only letters, digits or underscore"
        )
    )]
    pub username: String,
    #[validate(length(min = 6, message = "password must contain at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub full_name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct LoginUserRequest {
    #[validate(
        length(min = 3, max = 32, message = "username must contain 3-32 characters"),
        regex(
            path = *USERNAME_PATTERN,
            message = "username must contain only letters, digits or underscore"
        )
    )]
    pub username: String,
    #[validate(length(min = 6, message = "password must contain at least 6 characters"))]
    pub password: String,
}

/// User as returned to callers; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginUserResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}
