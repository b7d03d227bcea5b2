//! HTTP plumbing shared by every service router.

pub mod request_id;

use axum::{middleware::from_fn, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

/// Maximum accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Adds `/health` and wraps the router with the standard middleware stack.
///
/// Layers listed outermost first: SetRequestId, PropagateRequestId, request-id
/// extension, Trace, BodyLimit. Axum applies `.layer` inside-out, so they are added
/// in reverse.
pub fn with_standard_layers(router: Router) -> Router {
    let x_request_id = request_id::header();

    router
        .route("/health", get(health_check))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(request_id::create_trace_layer())
        .layer(from_fn(request_id::push_req_id_to_extensions))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
}
