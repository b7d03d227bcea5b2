use axum::Json;
use modkit::api::problem::{FieldError, Problem};
use utoipa::OpenApi;

use crate::api::rest::dto::{CreateUserReq, UpdateUserReq, UserDto};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "users_info", description = "CRUD over user records"),
    paths(
        handlers::create_user,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user
    ),
    components(schemas(UserDto, CreateUserReq, UpdateUserReq, Problem, FieldError)),
    tags((name = "users", description = "User records"))
)]
pub struct UsersApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(UsersApiDoc::openapi())
}
