use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use modkit::api::problem::{FieldError, Problem, ProblemResponse};
use modkit::http::request_id::XRequestId;

use crate::contract::{FieldViolation, UsersInfoError};

/// Where the problem occurred: request path and correlation id.
#[derive(Debug, Clone, Default)]
pub struct ProblemCtx {
    pub instance: String,
    pub request_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ProblemCtx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            instance: parts.uri.path().to_owned(),
            request_id: parts.extensions.get::<XRequestId>().map(|r| r.0.clone()),
        })
    }
}

fn problem(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    at: &ProblemCtx,
) -> Problem {
    Problem::new(status, code, title)
        .detail(detail)
        .at(at.instance.clone(), at.request_id.clone())
}

fn pointers(errors: &[FieldViolation]) -> Vec<FieldError> {
    errors
        .iter()
        .map(|v| FieldError {
            detail: v.message.clone(),
            pointer: if v.field.is_empty() {
                String::new()
            } else {
                format!("/{}", v.field)
            },
        })
        .collect()
}

/// Map a users_info error to an RFC 9457 problem response.
pub fn map_domain_error(e: &UsersInfoError, at: &ProblemCtx) -> ProblemResponse {
    let body = match e {
        UsersInfoError::Validation { errors } => problem(
            StatusCode::BAD_REQUEST,
            "USERS_VALIDATION",
            "Validation error",
            e.to_string(),
            at,
        )
        .with_errors(pointers(errors)),
        UsersInfoError::MissingIdentifier => problem(
            StatusCode::BAD_REQUEST,
            "USERS_MISSING_ID",
            "Missing identifier",
            "A user id is required",
            at,
        ),
        UsersInfoError::NotFound { id } => problem(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            at,
        ),
        UsersInfoError::Persistence { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                at,
            )
        }
        UsersInfoError::Timeout { operation, .. } => {
            tracing::warn!(error = %e, "Request did not complete");
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "USERS_TIMEOUT",
                "Request interrupted",
                format!("{operation} did not complete before the request was cancelled"),
                at,
            )
        }
    };
    ProblemResponse(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::Interrupted;

    fn at() -> ProblemCtx {
        ProblemCtx {
            instance: "/users/42".into(),
            request_id: Some("req-1".into()),
        }
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (UsersInfoError::not_found("42"), 404, "USERS_NOT_FOUND"),
            (UsersInfoError::MissingIdentifier, 400, "USERS_MISSING_ID"),
            (UsersInfoError::invalid_body("bad json"), 400, "USERS_VALIDATION"),
            (UsersInfoError::persistence("disk on fire"), 500, "INTERNAL_DB"),
            (
                UsersInfoError::timeout("users.get", Interrupted::Cancelled),
                500,
                "USERS_TIMEOUT",
            ),
        ];
        for (err, status, code) in cases {
            let ProblemResponse(p) = map_domain_error(&err, &at());
            assert_eq!(p.status, status, "{err:?}");
            assert_eq!(p.code, code);
            assert_eq!(p.instance, "/users/42");
            assert_eq!(p.request_id.as_deref(), Some("req-1"));
        }
    }

    #[test]
    fn persistence_detail_is_not_exposed() {
        let ProblemResponse(p) =
            map_domain_error(&UsersInfoError::persistence("password=hunter2"), &at());
        assert!(!p.detail.contains("hunter2"));
    }

    #[test]
    fn validation_errors_carry_json_pointers() {
        let err = UsersInfoError::validation(vec![FieldViolation {
            field: "email".into(),
            message: "must be a valid email address".into(),
        }]);
        let ProblemResponse(p) = map_domain_error(&err, &ProblemCtx::default());
        let errors = p.errors;
        assert_eq!(errors[0].pointer, "/email");
        assert!(p.request_id.is_none());
    }
}
