//! Test assertion helpers for API responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use simplebank::Account;

pub fn assert_body_matches_account(body: &[u8], account: &Account) {
    let got: Account = serde_json::from_slice(body).expect("body should be an account");
    assert_eq!(&got, account);
}

/// Asserts the body is `{"error": ...}` and never mentions `leaked`
pub fn assert_error_body(body: &[u8], leaked: Option<&str>) {
    let value: serde_json::Value = serde_json::from_slice(body).expect("body should be JSON");
    assert!(value["error"].is_string(), "missing error field: {}", value);

    if let Some(leaked) = leaked {
        let text = String::from_utf8_lossy(body);
        assert!(
            !text.contains(leaked),
            "response leaked internal detail: {}",
            text
        );
    }
}
