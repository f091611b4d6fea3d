use serde::{Deserialize, Serialize};

use crate::db::Currency;
use crate::shared::AppError;

pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 10;

/// Request body for opening an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateAccountRequest {
    pub currency: String,
}

/// Query string for listing accounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListAccountsRequest {
    pub page_id: i64,
    pub page_size: i64,
}

/// Request payload for fetching one account over RPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetAccountRequest {
    pub id: i64,
}

/// Validated pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Checks that an account id is positive
pub fn validate_account_id(id: i64) -> Result<i64, AppError> {
    if id <= 0 {
        return Err(AppError::BadRequest(format!(
            "account id must be a positive integer, got {}",
            id
        )));
    }
    Ok(id)
}

/// Parses an account id from a path segment
pub fn parse_account_id(raw: &str) -> Result<i64, AppError> {
    let id = raw
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("account id must be a positive integer".to_string()))?;
    validate_account_id(id)
}

pub fn parse_currency(code: &str) -> Result<Currency, AppError> {
    Currency::parse(code)
        .ok_or_else(|| AppError::BadRequest(format!("unsupported currency: {}", code)))
}

impl ListAccountsRequest {
    pub fn page(&self) -> Result<Page, AppError> {
        if self.page_id < 1 {
            return Err(AppError::BadRequest("page_id must be at least 1".to_string()));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(AppError::BadRequest(format!(
                "page_size must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }

        let offset = (self.page_id - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| AppError::BadRequest("page_id is out of range".to_string()))?;

        Ok(Page {
            limit: self.page_size,
            offset,
        })
    }
}
