use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::maker::TokenError;

/// Claims carried inside a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    pub id: Uuid,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl Payload {
    /// Builds a fresh payload valid for `duration` starting at `now`
    pub fn new(username: &str, duration: Duration, now: DateTime<Utc>) -> Result<Self, TokenError> {
        if duration <= Duration::zero() {
            return Err(TokenError::InvalidDuration);
        }

        let expired_at = now
            .checked_add_signed(duration)
            .ok_or(TokenError::InvalidDuration)?;

        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at: now,
            expired_at,
        })
    }

    /// Fails with `ExpiredToken` once `now` is past the expiry time
    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if now > self.expired_at {
            return Err(TokenError::ExpiredToken);
        }
        Ok(())
    }
}
