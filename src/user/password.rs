use tracing::error;

use crate::shared::AppError;

/// Hashes a password with bcrypt on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AppError::Internal
        })
}

/// Returns whether `password` matches `hashed_password`
pub async fn check_password(password: String, hashed_password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed_password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            error!(error = %e, "Stored password hash is unreadable");
            AppError::Internal
        })
}
