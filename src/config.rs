use std::fmt;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use strum_macros::{Display, EnumString};
use thiserror::Error;

const BCRYPT_COSTS: std::ops::RangeInclusive<u32> = 4..=31;

/// Which token scheme the server issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Symmetric,
    Jwt,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment
#[derive(Clone)]
pub struct Config {
    pub http_server_address: String,
    pub database_url: Option<String>,
    pub token_symmetric_key: String,
    pub token_kind: TokenKind,
    pub access_token_duration: Duration,
    pub request_timeout: StdDuration,
    pub store_timeout: StdDuration,
    pub password_hash_cost: u32,
}

impl Config {
    /// Configuration with default settings around the given token key
    pub fn with_symmetric_key(token_symmetric_key: impl Into<String>) -> Self {
        Self {
            http_server_address: "0.0.0.0:8080".to_string(),
            database_url: None,
            token_symmetric_key: token_symmetric_key.into(),
            token_kind: TokenKind::Symmetric,
            access_token_duration: Duration::minutes(15),
            request_timeout: StdDuration::from_secs(30),
            store_timeout: StdDuration::from_secs(10),
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup("TOKEN_SYMMETRIC_KEY").ok_or(ConfigError::Missing("TOKEN_SYMMETRIC_KEY"))?;
        let mut config = Self::with_symmetric_key(key);

        if let Some(address) = lookup("HTTP_SERVER_ADDRESS") {
            config.http_server_address = address;
        }
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        if let Some(kind) = lookup("TOKEN_KIND") {
            config.token_kind = kind.parse().map_err(|_| ConfigError::Invalid {
                key: "TOKEN_KIND",
                value: kind.clone(),
            })?;
        }
        if let Some(minutes) = parse_number(&lookup, "ACCESS_TOKEN_DURATION_MINUTES")? {
            config.access_token_duration = token_duration(minutes).ok_or(ConfigError::Invalid {
                key: "ACCESS_TOKEN_DURATION_MINUTES",
                value: minutes.to_string(),
            })?;
        }
        if let Some(secs) = parse_number(&lookup, "REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = StdDuration::from_secs(secs);
        }
        if let Some(secs) = parse_number(&lookup, "STORE_TIMEOUT_SECS")? {
            config.store_timeout = StdDuration::from_secs(secs);
        }
        if let Some(cost) = parse_number(&lookup, "BCRYPT_COST")? {
            config.password_hash_cost = u32::try_from(cost)
                .ok()
                .filter(|cost| BCRYPT_COSTS.contains(cost))
                .ok_or(ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    value: cost.to_string(),
                })?;
        }

        Ok(config)
    }
}

/// Token lifetime in minutes, if positive and representable as an expiry time from now
fn token_duration(minutes: u64) -> Option<Duration> {
    let duration = i64::try_from(minutes).ok().and_then(Duration::try_minutes)?;
    if duration <= Duration::zero() {
        return None;
    }
    Utc::now().checked_add_signed(duration).map(|_| duration)
}

fn parse_number<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("http_server_address", &self.http_server_address)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("token_symmetric_key", &"<redacted>")
            .field("token_kind", &self.token_kind)
            .field("access_token_duration", &self.access_token_duration)
            .field("request_timeout", &self.request_timeout)
            .field("store_timeout", &self.store_timeout)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}
