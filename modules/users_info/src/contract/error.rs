use modkit::Interrupted;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Errors returned by every users_info operation.
///
/// Repository errors travel through the service unchanged; only the REST layer
/// translates them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersInfoError {
    #[error("validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldViolation> },

    #[error("user id is required")]
    MissingIdentifier,

    #[error("user not found: {id}")]
    NotFound { id: String },

    #[error("persistence failure: {message}")]
    Persistence { message: String },

    #[error("{operation} interrupted: {reason}")]
    Timeout {
        operation: &'static str,
        reason: Interrupted,
    },
}

fn summarize(errors: &[FieldViolation]) -> String {
    errors
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl UsersInfoError {
    pub fn validation(errors: Vec<FieldViolation>) -> Self {
        Self::Validation { errors }
    }

    /// Request body that could not be decoded into the expected shape.
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldViolation {
                field: String::new(),
                message: message.into(),
            }],
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn timeout(operation: &'static str, reason: Interrupted) -> Self {
        Self::Timeout { operation, reason }
    }
}
