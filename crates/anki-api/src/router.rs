use axum::{
    Json, Router, http::StatusCode, middleware, response::IntoResponse, routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    admin, card,
    config::Environment,
    error::NOT_FOUND_MESSAGE,
    middleware::{apply_security_headers, request_id_middleware},
    site,
    state::ApiState,
    user,
};

pub fn router(environment: Environment) -> Router<ApiState> {
    let router = Router::new()
        .route("/health", get(health))
        .merge(site::routes())
        .merge(card::routes())
        .merge(user::routes())
        .merge(admin::routes())
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http());

    apply_security_headers(router, environment).layer(middleware::from_fn(request_id_middleware))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": NOT_FOUND_MESSAGE })),
    )
}
