//! AES-256-GCM session tokens
//!
//! Token layout: `v1.local.` followed by base64url (no padding) of the
//! 12-byte nonce and the ciphertext. The header is bound as associated data
//! so a token cannot be replayed under a different header.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload as AeadPayload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::clock::{Clock, SystemClock};
use super::maker::{Maker, TokenError};
use super::payload::Payload;

pub const SYMMETRIC_KEY_SIZE: usize = 32;

const HEADER: &str = "v1.local.";
const NONCE_SIZE: usize = 12;

pub struct SymmetricMaker {
    cipher: Aes256Gcm,
    clock: Arc<dyn Clock>,
}

impl SymmetricMaker {
    pub fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        Self::with_clock(symmetric_key, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(symmetric_key: &str, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let key = symmetric_key.as_bytes();
        if key.len() != SYMMETRIC_KEY_SIZE {
            return Err(TokenError::InvalidKeySize {
                expected: SYMMETRIC_KEY_SIZE,
                actual: key.len(),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| TokenError::InvalidKeySize {
            expected: SYMMETRIC_KEY_SIZE,
            actual: key.len(),
        })?;

        Ok(Self { cipher, clock })
    }

    fn decrypt(&self, token: &str) -> Result<Payload, TokenError> {
        let encoded = token.strip_prefix(HEADER).ok_or(TokenError::InvalidToken)?;
        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::InvalidToken)?;
        if raw.len() <= NONCE_SIZE {
            return Err(TokenError::InvalidToken);
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                AeadPayload {
                    msg: ciphertext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::InvalidToken)?;

        serde_json::from_slice(&plaintext).map_err(|_| TokenError::InvalidToken)
    }
}

impl Maker for SymmetricMaker {
    #[instrument(skip(self, duration))]
    fn create_token(
        &self,
        username: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, duration, self.clock.now())?;
        let plaintext =
            serde_json::to_vec(&payload).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                AeadPayload {
                    msg: &plaintext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        debug!(token_id = %payload.id, expired_at = %payload.expired_at, "Created symmetric token");
        Ok((format!("{}{}", HEADER, URL_SAFE_NO_PAD.encode(raw)), payload))
    }

    #[instrument(skip(self, token))]
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = self.decrypt(token)?;
        payload.check_expiry(self.clock.now())?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::clock::ManualClock;
    use crate::util::random::random_string;
    use chrono::Utc;
    use rstest::rstest;

    #[test]
    fn test_create_and_verify_token() {
        let maker = SymmetricMaker::new(&random_string(32)).unwrap();
        let duration = Duration::minutes(1);

        let (token, payload) = maker.create_token("alice", duration).unwrap();
        assert!(token.starts_with(HEADER));

        let verified = maker.verify_token(&token).unwrap();
        assert_eq!(verified, payload);
        assert_eq!(verified.username, "alice");
        assert_eq!(verified.expired_at - verified.issued_at, duration);
    }

    #[rstest]
    #[case::one_second(Duration::seconds(1))]
    #[case::one_day(Duration::days(1))]
    #[case::a_century(Duration::days(36_500))]
    fn test_round_trip_for_any_positive_duration(#[case] duration: Duration) {
        let maker = SymmetricMaker::new(&random_string(32)).unwrap();

        let (token, payload) = maker.create_token("alice", duration).unwrap();

        assert_eq!(maker.verify_token(&token), Ok(payload));
    }

    #[rstest]
    #[case::max(Duration::MAX)]
    #[case::beyond_calendar(Duration::days(365 * 300_000))]
    fn test_oversized_duration_is_an_error(#[case] duration: Duration) {
        let maker = SymmetricMaker::new(&random_string(32)).unwrap();

        let result = maker.create_token("alice", duration);

        assert!(matches!(result, Err(TokenError::InvalidDuration)));
    }

    #[test]
    fn test_expired_token() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let maker = SymmetricMaker::with_clock(&random_string(32), clock.clone()).unwrap();

        let (token, _) = maker.create_token("alice", Duration::minutes(1)).unwrap();
        clock.advance(Duration::minutes(1) + Duration::seconds(1));

        assert_eq!(maker.verify_token(&token), Err(TokenError::ExpiredToken));
    }

    #[test]
    fn test_invalid_key_size() {
        let result = SymmetricMaker::new(&random_string(31));
        assert!(matches!(
            result,
            Err(TokenError::InvalidKeySize {
                expected: 32,
                actual: 31
            })
        ));
        assert!(SymmetricMaker::new(&random_string(33)).is_err());
    }

    #[test]
    fn test_token_from_other_key_is_invalid() {
        let maker1 = SymmetricMaker::new(&random_string(32)).unwrap();
        let maker2 = SymmetricMaker::new(&random_string(32)).unwrap();

        let (token, _) = maker1.create_token("alice", Duration::minutes(1)).unwrap();
        assert_eq!(maker2.verify_token(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let maker = SymmetricMaker::new(&random_string(32)).unwrap();
        let (token, _) = maker.create_token("alice", Duration::minutes(1)).unwrap();

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(maker.verify_token(&tampered), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let maker = SymmetricMaker::new(&random_string(32)).unwrap();

        for token in ["", "v1.local.", "v1.local.!!!", "v2.local.AAAA", "not-a-token"] {
            assert_eq!(maker.verify_token(token), Err(TokenError::InvalidToken));
        }
    }

    #[test]
    fn test_expired_and_tampered_reports_invalid() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let maker = SymmetricMaker::with_clock(&random_string(32), clock.clone()).unwrap();
        let (token, _) = maker.create_token("alice", Duration::minutes(1)).unwrap();
        clock.advance(Duration::hours(1));

        let tampered = format!("{}x", token);
        assert_eq!(maker.verify_token(&tampered), Err(TokenError::InvalidToken));
    }
}
