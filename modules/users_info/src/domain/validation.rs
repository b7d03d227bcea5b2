//! Structural input checks run by the service before any write.

use validator::{Validate, ValidationErrors};

use crate::contract::{FieldViolation, NewUser, UserPatch, UsersInfoError};

/// Drop empty strings so they read as "leave unchanged".
pub fn normalize_patch(patch: UserPatch) -> UserPatch {
    let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
    UserPatch {
        first_name: keep(patch.first_name),
        last_name: keep(patch.last_name),
        email: keep(patch.email),
    }
}

pub fn validate_new_user(new_user: &NewUser) -> Result<(), UsersInfoError> {
    new_user.validate().map_err(into_domain)
}

/// Expects a patch already passed through [`normalize_patch`].
pub fn validate_patch(patch: &UserPatch) -> Result<(), UsersInfoError> {
    patch.validate().map_err(into_domain)
}

fn into_domain(errors: ValidationErrors) -> UsersInfoError {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldViolation {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    UsersInfoError::validation(violations)
}
