use serde::{Deserialize, Serialize};

use crate::shared::AppError;

/// Methods served over the RPC transport
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcMethod {
    CreateUser,
    LoginUser,
    CreateAccount,
    GetAccount,
    ListAccounts,
}

/// Status codes carried in every RPC response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcCode {
    Ok,
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: RpcMethod,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub code: RpcCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AppError> for RpcCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::BadRequest(_) => RpcCode::InvalidArgument,
            AppError::Unauthorized(_) => RpcCode::Unauthenticated,
            AppError::Forbidden(_) => RpcCode::PermissionDenied,
            AppError::NotFound(_) => RpcCode::NotFound,
            AppError::Internal => RpcCode::Internal,
        }
    }
}

impl RpcResponse {
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            code: RpcCode::Ok,
            payload: Some(payload),
            message: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.into(),
            payload: None,
            message: Some(err.public_message()),
        }
    }
}
