//! Helpers for driving the router in tests

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use user_service::{CredentialConfig, ServiceConfig, StorageConfig, UserService};

use crate::router::user_service_router_no_trace;

/// Service over a private in-memory database with a cheap work factor
pub(crate) async fn memory_service() -> UserService {
    let config = ServiceConfig {
        storage: StorageConfig::in_memory(),
        credential: CredentialConfig { iterations: 1_000 },
        max_name_length: 32,
        ..ServiceConfig::default()
    };
    UserService::new(config)
        .await
        .expect("Failed to build in-memory user service")
}

pub(crate) async fn test_router() -> (Router, UserService) {
    let service = memory_service().await;
    (user_service_router_no_trace(service.clone()), service)
}

pub(crate) fn json_request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("Failed to build request")
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Send one request and decode the JSON reply
pub(crate) async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}
