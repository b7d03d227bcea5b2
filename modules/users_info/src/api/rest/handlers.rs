use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::Json,
    Extension,
};
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::RequestCtx;
use tracing::debug;

use crate::api::rest::dto::{CreateUserReq, UpdateUserReq, UserDto};
use crate::api::rest::error::{map_domain_error, ProblemCtx};
use crate::contract::{UsersInfoApi, UsersInfoError};

type Svc = Extension<Arc<dyn UsersInfoApi>>;

/// Decode failures are validation-class errors; the service is never called.
fn decoded<T>(body: Result<Json<T>, JsonRejection>, at: &ProblemCtx) -> Result<T, ProblemResponse> {
    body.map(|Json(v)| v).map_err(|rejection| {
        debug!(error = %rejection.body_text(), "rejected request body");
        map_domain_error(&UsersInfoError::invalid_body(rejection.body_text()), at)
    })
}

/// `/users/` has no id segment; it reaches the same handlers with an empty id.
fn id_of(id: Option<Path<String>>) -> String {
    id.map(|Path(id)| id).unwrap_or_default()
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_user(
    Extension(svc): Svc,
    ctx: RequestCtx,
    at: ProblemCtx,
    body: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let req = decoded(body, &at)?;
    let user = svc
        .create_user(&ctx, req.into())
        .await
        .map_err(|e| map_domain_error(&e, &at))?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Missing id", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_user(
    Extension(svc): Svc,
    ctx: RequestCtx,
    at: ProblemCtx,
    id: Option<Path<String>>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let id = id_of(id);
    let user = svc
        .get_user(&ctx, &id)
        .await
        .map_err(|e| map_domain_error(&e, &at))?;
    Ok(Json(user.into()))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid input or missing id", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user(
    Extension(svc): Svc,
    ctx: RequestCtx,
    at: ProblemCtx,
    id: Option<Path<String>>,
    body: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let id = id_of(id);
    let req = decoded(body, &at)?;
    let user = svc
        .update_user(&ctx, &id, req.into())
        .await
        .map_err(|e| map_domain_error(&e, &at))?;
    Ok(Json(user.into()))
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Missing id", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_user(
    Extension(svc): Svc,
    ctx: RequestCtx,
    at: ProblemCtx,
    id: Option<Path<String>>,
) -> Result<StatusCode, ProblemResponse> {
    let id = id_of(id);
    svc.delete_user(&ctx, &id)
        .await
        .map_err(|e| map_domain_error(&e, &at))?;
    Ok(StatusCode::NO_CONTENT)
}
