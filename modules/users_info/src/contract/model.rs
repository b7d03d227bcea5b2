use std::borrow::Cow;

use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

/// Rejects empty and whitespace-only names.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be blank"));
        return Err(err);
    }
    Ok(())
}

/// User record as seen by other modules (no serde/utoipa).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// UUIDv4 rendered as text; assigned at creation and never changed.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct NewUser {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// Partial update data for a user.
///
/// `None` and `Some("")` both leave the stored value unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct UserPatch {
    #[validate(custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected_with_a_stable_code() {
        for value in ["", " ", "\t\n"] {
            let err = not_blank(value).unwrap_err();
            assert_eq!(err.code, "blank");
        }
        assert!(not_blank(" Jane ").is_ok());
    }
}
