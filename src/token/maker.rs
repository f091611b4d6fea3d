use chrono::Duration;
use thiserror::Error;

use super::payload::Payload;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid key size: must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("token duration must be positive")]
    InvalidDuration,

    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Issues and verifies session tokens.
///
/// Implementations hold only immutable key material after construction and
/// are shared across requests without locking.
pub trait Maker: Send + Sync {
    /// Creates a token for `username` valid for `duration`, returning the
    /// token together with the payload it carries
    fn create_token(&self, username: &str, duration: Duration)
        -> Result<(String, Payload), TokenError>;

    /// Checks the token and returns its payload.
    ///
    /// Any decoding or authentication failure is `InvalidToken`; a token
    /// that decodes but is past its expiry is `ExpiredToken`.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}
