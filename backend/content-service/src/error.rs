/// Error types for Content Service
///
/// Errors are converted to HTTP responses for API clients. Lookup failures and
/// policy denials arrive as `AccessError` and keep separate variants here.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use content_authz::AccessError;
use thiserror::Error;

/// Result type for content-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Cache operation failed
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Validation failed
    #[error("{0}")]
    ValidationError(String),

    /// Resource could not be resolved
    #[error("{0}")]
    NotFound(String),

    /// Resource exists but the policy denied access
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::CacheError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound { .. } => AppError::NotFound(err.to_string()),
            AccessError::Unauthorized => AppError::Unauthorized(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
