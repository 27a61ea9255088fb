/// Error types for the posts service
///
/// Every request-scoped failure is mapped to an HTTP response here; nothing in
/// this taxonomy is allowed to crash the process.
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::middleware::LOGIN_URL;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// User input rejected before persistence; displays the localized field
    /// message verbatim so the renderer can show it next to the input.
    #[error("{0}")]
    ValidationError(String),

    /// Unknown username, post, group or slug
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mutating action attempted without an authenticated session
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but not allowed (e.g. editing someone else's post)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed request (unknown group id, bad pagination, ...)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Unauthenticated users are redirected to the login entry point,
            // never shown an error page.
            AppError::Unauthorized => StatusCode::FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Unauthorized = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_URL))
                .finish();
        }

        let status = self.status_code();
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
