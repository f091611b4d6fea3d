use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::clock::{Clock, SystemClock};
use super::maker::{Maker, TokenError};
use super::payload::Payload;

pub const MIN_SECRET_KEY_SIZE: usize = 32;

/// HS256 JSON Web Token maker
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtMaker {
    pub fn new(secret_key: &str) -> Result<Self, TokenError> {
        Self::with_clock(secret_key, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(secret_key: &str, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret_key.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidKeySize {
                expected: MIN_SECRET_KEY_SIZE,
                actual: secret_key.len(),
            });
        }

        // Expiry is checked against the injected clock instead of the
        // library's wall-clock validation.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            validation,
            clock,
        })
    }
}

impl Maker for JwtMaker {
    #[instrument(skip(self, duration))]
    fn create_token(
        &self,
        username: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, duration, self.clock.now())?;

        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| {
                debug!(error = %e, "Failed to encode JWT token");
                TokenError::Encoding(e.to_string())
            })?;

        debug!(token_id = %payload.id, expired_at = %payload.expired_at, "Created JWT token");
        Ok((token, payload))
    }

    #[instrument(skip(self, token))]
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = decode::<Payload>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                TokenError::InvalidToken
            })?;

        payload.check_expiry(self.clock.now())?;
        Ok(payload)
    }
}
