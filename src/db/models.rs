use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Database model for the accounts table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64, // minor units
    pub currency: String,
}

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Currencies an account can be opened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr)]
pub enum Currency {
    #[strum(serialize = "USD")]
    Usd,
    #[strum(serialize = "EUR")]
    Eur,
    #[strum(serialize = "CAD")]
    Cad,
}

impl Currency {
    /// Parses a currency code, accepting only the exact upper-case form
    pub fn parse(code: &str) -> Option<Self> {
        code.parse().ok()
    }
}
