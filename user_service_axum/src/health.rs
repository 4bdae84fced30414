use axum::{Json, Router, extract::State, routing::get};
use http::StatusCode;

use user_service::{Health, UserService};

use crate::types::HealthResponse;

pub(super) fn router() -> Router<UserService> {
    Router::new().route("/health", get(health_check))
}

/// 200 `{"status": "ok"}` while the store answers, 503 otherwise
pub(super) async fn health_check(
    State(service): State<UserService>,
) -> (StatusCode, Json<HealthResponse>) {
    match service.health_check().await {
        Health::Healthy => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                reason: None,
            }),
        ),
        Health::Degraded { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                reason: Some(reason),
            }),
        ),
    }
}
