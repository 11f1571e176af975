use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation targets an id that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Calculator given an end date before the start date
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn invalid_range(msg: impl Into<String>) -> Self {
        AppError::InvalidRange(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
