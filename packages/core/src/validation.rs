// ABOUTME: Form validation error shared by the tag fields and the HTTP layer
// ABOUTME: Carries the field name and a user-facing message

use serde::Serialize;
use thiserror::Error;

/// Message used when a required field is missing or blank
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// A user-facing validation failure for a single form field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, REQUIRED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_field_and_message() {
        let err = ValidationError::new("name", "Multiple tags were given.");
        assert_eq!(err.to_string(), "name: Multiple tags were given.");
    }

    #[test]
    fn test_required() {
        let err = ValidationError::required("tags");
        assert_eq!(err.field, "tags");
        assert_eq!(err.message, REQUIRED_MESSAGE);
    }

    #[test]
    fn test_serializes_as_object() {
        let err = ValidationError::new("tags", "bad");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["field"], "tags");
        assert_eq!(value["message"], "bad");
    }
}
