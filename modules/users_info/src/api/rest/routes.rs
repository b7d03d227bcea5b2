use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::{handlers, openapi};
use crate::contract::UsersInfoApi;

pub fn register_routes(router: Router, service: Arc<dyn UsersInfoApi>) -> Router {
    router
        .route("/users", post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/users/",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(Extension(service))
}
