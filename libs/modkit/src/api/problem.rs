//! RFC 9457 problem details.
//!
//! `code` is the stable machine key clients branch on; the `type` URI is
//! derived from it so the two never drift apart.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

const TYPE_BASE: &str = "https://errors.example.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(title = "Problem", description = "RFC 9457 problem details")]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    /// Request path the problem occurred on.
    pub instance: String,
    pub code: String,
    /// Echo of the `x-request-id` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// One rejected input location. `pointer` is a JSON Pointer; "" means the whole body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub pointer: String,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, code: &str, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            type_url: format!("{TYPE_BASE}{code}"),
            detail: title.clone(),
            title,
            status: status.as_u16(),
            instance: String::new(),
            code: code.to_owned(),
            request_id: None,
            errors: Vec::new(),
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Where it happened: request path plus correlation id, if any.
    pub fn at(mut self, instance: impl Into<String>, request_id: Option<String>) -> Self {
        self.instance = instance.into();
        self.request_id = request_id;
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}

/// Renders a [`Problem`] with its status and the problem+json content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = (status, Json(self.0)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_user_renders_as_problem_json() {
        let p = Problem::new(StatusCode::NOT_FOUND, "USERS_NOT_FOUND", "User not found")
            .detail("User with id 42 was not found")
            .at("/users/42", Some("req-1".into()));
        let resp = ProblemResponse(p).into_response();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }

    #[test]
    fn type_follows_code_and_empty_members_are_omitted() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "USERS_MISSING_ID", "Missing identifier");
        let v = serde_json::to_value(&p).unwrap();

        assert_eq!(v["type"], "https://errors.example.com/USERS_MISSING_ID");
        assert_eq!(v["detail"], "Missing identifier");
        assert_eq!(v["status"], 400);
        assert!(v.get("errors").is_none());
        assert!(v.get("request_id").is_none());
    }

    #[test]
    fn validation_problem_lists_field_pointers() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "USERS_VALIDATION", "Validation error")
            .with_errors(vec![
                FieldError {
                    pointer: "/email".into(),
                    detail: "must be a valid email address".into(),
                },
                FieldError {
                    pointer: "/last_name".into(),
                    detail: "must not be blank".into(),
                },
            ]);
        let v = serde_json::to_value(&p).unwrap();

        assert_eq!(v["errors"][0]["pointer"], "/email");
        assert_eq!(v["errors"][1]["detail"], "must not be blank");
    }

    #[test]
    fn out_of_range_status_renders_as_500() {
        let mut p = Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_DB", "Internal error");
        p.status = 42;
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
