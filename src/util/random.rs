//! Random data generators for tests and local fixtures

use rand::Rng;
use strum::IntoEnumIterator;

use crate::db::models::Currency;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Random integer in `min..=max`
pub fn random_int(min: i64, max: i64) -> i64 {
    rand::rng().random_range(min..=max)
}

/// Random lowercase string of length `n`
pub fn random_string(n: usize) -> String {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn random_owner() -> String {
    random_string(6)
}

pub fn random_money() -> i64 {
    random_int(0, 1000)
}

pub fn random_currency() -> Currency {
    let currencies: Vec<Currency> = Currency::iter().collect();
    currencies[rand::rng().random_range(0..currencies.len())]
}

pub fn random_email() -> String {
    format!("{}@email.com", random_string(6))
}
