//! Combined router for all user service endpoints

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use user_service::UserService;

/// Largest request body accepted, in bytes
///
/// Leaves room for a maximum-length name and password even when every character
/// arrives as a JSON `\u` escape.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Create a router for all user service endpoints
///
/// The endpoints are:
/// - `POST /users`, `GET /users?name=...`
/// - `GET /users/{id}`, `POST /users/{id}/verify`
/// - `GET /users/active`
/// - `GET /health`
pub fn user_service_router(service: UserService) -> Router {
    user_service_router_no_trace(service).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`user_service_router`] but without the HTTP tracing middleware
///
/// Use this if you want to add your own tracing middleware.
pub fn user_service_router_no_trace(service: UserService) -> Router {
    Router::new()
        .nest("/users", super::user::router())
        .merge(super::health::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(service)
}
