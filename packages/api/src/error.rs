use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tagging_core::ValidationError;
use tagging_storage::StorageError;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Optional message shown to the client
    #[error("Resource not found")]
    NotFound(Option<String>),

    /// A view was wired up incorrectly; meant for developers, not end users
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl AppError {
    /// Convert AppError to appropriate HTTP status code and error code
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ImproperlyConfigured(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Storage(storage_error) => match storage_error {
                StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
                StorageError::Duplicate(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME"),
                StorageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            },
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.message.clone(),
            AppError::NotFound(Some(message)) => message.clone(),
            AppError::NotFound(None) => "The requested resource was not found".to_string(),
            AppError::ImproperlyConfigured(_) => "Server configuration error".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::Storage(storage_error) => match storage_error {
                StorageError::NotFound(resource) => format!("{} not found", resource),
                StorageError::Duplicate(message) | StorageError::InvalidInput(message) => {
                    message.clone()
                }
                _ => "Data storage error".to_string(),
            },
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            AppError::Validation(err) => Some(err.field.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();

        // Log internal errors with full context but don't expose details
        match &self {
            AppError::Internal(err) => {
                error!(
                    request_id = %request_id,
                    error = %err,
                    "Internal server error occurred"
                );
            }
            AppError::ImproperlyConfigured(msg) => {
                error!(
                    request_id = %request_id,
                    config_error = %msg,
                    "Configuration error"
                );
            }
            AppError::Storage(storage_err) if status_code.is_server_error() => {
                error!(
                    request_id = %request_id,
                    storage_error = %storage_err,
                    "Storage system error"
                );
            }
            _ => {
                // Expected business logic errors
                tracing::info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
        }

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: self.to_user_message(),
                field: self.field(),
            },
            request_id,
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper functions for common error scenarios
impl AppError {
    pub fn not_found() -> Self {
        Self::NotFound(None)
    }

    pub fn not_found_with(msg: impl Into<String>) -> Self {
        Self::NotFound(Some(msg.into()))
    }

    pub fn improperly_configured(msg: impl Into<String>) -> Self {
        Self::ImproperlyConfigured(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status() {
        let error = AppError::from(ValidationError::new("tags", "bad"));
        let (status, code) = error.to_status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(error.field().as_deref(), Some("tags"));
    }

    #[test]
    fn test_not_found_error() {
        let error = AppError::not_found_with("No Tag found matching \"x\".");
        let (status, code) = error.to_status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(error.to_user_message(), "No Tag found matching \"x\".");
    }

    #[test]
    fn test_storage_error_mapping() {
        let error = AppError::from(StorageError::Duplicate("Tag 'x' already exists".into()));
        assert_eq!(error.to_status_and_code().0, StatusCode::CONFLICT);

        let error = AppError::from(StorageError::NotFound("Tag 'x'".into()));
        assert_eq!(error.to_status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(error.to_user_message(), "Tag 'x' not found");

        let error = AppError::from(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )));
        assert_eq!(error.to_status_and_code().1, "STORAGE_ERROR");
        assert!(!error.to_user_message().contains("disk"));
    }

    #[test]
    fn test_configuration_message_is_sanitized() {
        let error = AppError::improperly_configured("TaggedObjectList is missing a QuerySet.");
        let (status, code) = error.to_status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CONFIGURATION_ERROR");
        assert!(!error.to_user_message().contains("QuerySet"));
    }

    #[test]
    fn test_user_message_sanitization() {
        let internal_error = AppError::internal(anyhow::anyhow!(
            "Database connection failed with password xyz"
        ));
        let message = internal_error.to_user_message();
        assert_eq!(message, "An internal server error occurred");
        assert!(!message.contains("xyz"));
    }
}
