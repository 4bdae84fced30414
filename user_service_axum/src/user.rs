use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::{get, post},
};
use http::StatusCode;

use user_service::{User, UserError, UserService};

use crate::error::{ErrorResponse, IntoResponseError};
use crate::types::{
    ActiveUsersResponse, CreateUserRequest, NameQuery, VerifyPasswordRequest,
    VerifyPasswordResponse,
};

/// Routes under `/users`
pub(super) fn router() -> Router<UserService> {
    Router::new()
        .route("/", post(create_user).get(find_user_by_name))
        .route("/active", get(list_active_users))
        .route("/{id}", get(get_user))
        .route("/{id}/verify", post(verify_password))
}

fn required(field: &'static str) -> UserError {
    UserError::Validation {
        field,
        reason: "is required".to_string(),
    }
}

/// Create a user from `{"name": ..., "password"?: ...}`
pub(super) async fn create_user(
    State(service): State<UserService>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ErrorResponse> {
    let Json(request) = payload.into_response_error()?;
    let name = request
        .name
        .ok_or_else(|| required("name"))
        .into_response_error()?;

    let user = service
        .create_user(&name, request.password.as_deref())
        .await
        .into_response_error()?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn get_user(
    State(service): State<UserService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ErrorResponse> {
    let Path(id) = id.into_response_error()?;
    let user = service.get_user(id).await.into_response_error()?;
    Ok(Json(user))
}

/// `GET /users?name=...`
pub(super) async fn find_user_by_name(
    State(service): State<UserService>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<User>, ErrorResponse> {
    let Query(query) = query.into_response_error()?;
    let name = query
        .name
        .ok_or_else(|| required("name"))
        .into_response_error()?;

    let user = service.get_user_by_name(&name).await.into_response_error()?;
    Ok(Json(user))
}

pub(super) async fn verify_password(
    State(service): State<UserService>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VerifyPasswordRequest>, JsonRejection>,
) -> Result<Json<VerifyPasswordResponse>, ErrorResponse> {
    let Path(id) = id.into_response_error()?;
    let Json(request) = payload.into_response_error()?;
    let password = request
        .password
        .ok_or_else(|| required("password"))
        .into_response_error()?;

    let verified = service
        .verify_password(id, &password)
        .await
        .into_response_error()?;

    Ok(Json(VerifyPasswordResponse { verified }))
}

pub(super) async fn list_active_users(
    State(service): State<UserService>,
) -> Json<ActiveUsersResponse> {
    Json(ActiveUsersResponse {
        active_users: service.active_users(),
    })
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;
    use user_service::MAX_PASSWORD_BYTES;

    use crate::test_utils::{get_request, json_request, send, test_router};

    #[tokio::test]
    async fn test_create_then_fetch_user() {
        // Given an empty service
        let (router, _service) = test_router().await;

        // When creating Alice
        let (status, created) = send(
            &router,
            json_request("POST", "/users", json!({"name": "Alice"}).to_string()),
        )
        .await;

        // Then she is returned with an id and can be fetched by it
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Alice");
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);
        assert!(created["created_at"].is_string());

        let (status, fetched) = send(&router, get_request(&format!("/users/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_missing_name_is_rejected_without_write() {
        let (router, service) = test_router().await;

        let (status, body) = send(&router, json_request("POST", "/users", "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["field"], "name");
        assert_eq!(service.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_and_oversized_names_are_rejected() {
        let (router, service) = test_router().await;

        let long = "x".repeat(33);
        for name in ["   ", long.as_str(), "bad\nname", "evil\u{202E}gpj.exe"] {
            let (status, body) = send(
                &router,
                json_request("POST", "/users", json!({ "name": name }).to_string()),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "name {name:?} accepted");
            assert_eq!(body["error"]["field"], "name");
        }
        assert_eq!(service.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_longest_allowed_password_fits_in_body() {
        // Given a password exactly at the length limit
        let (router, service) = test_router().await;
        let password = "p".repeat(MAX_PASSWORD_BYTES);

        // When creating a user with it
        let (status, created) = send(
            &router,
            json_request(
                "POST",
                "/users",
                json!({"name": "Erin", "password": password}).to_string(),
            ),
        )
        .await;

        // Then the body limit lets it through and the user can verify with it
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert!(service.verify_password(id, &password).await.unwrap());
    }

    #[tokio::test]
    async fn test_over_long_password_is_validation_error() {
        let (router, service) = test_router().await;
        let password = "p".repeat(MAX_PASSWORD_BYTES + 1);

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/users",
                json!({"name": "Erin", "password": password}).to_string(),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "password");
        assert_eq!(service.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (router, _service) = test_router().await;

        let (status, body) = send(&router, json_request("POST", "/users", "{\"name\":")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let (router, service) = test_router().await;
        let padding = "x".repeat(2 * crate::MAX_BODY_BYTES);

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/users",
                json!({"name": "Alice", "padding": padding}).to_string(),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "payload_too_large");
        assert_eq!(service.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let (router, _service) = test_router().await;

        let (status, body) = send(&router, get_request("/users/999999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let (router, _service) = test_router().await;

        let (status, body) = send(&router, get_request("/users/abc")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "id");
    }

    #[tokio::test]
    async fn test_find_user_by_name() {
        let (router, _service) = test_router().await;
        let (_, created) = send(
            &router,
            json_request("POST", "/users", json!({"name": "Bob"}).to_string()),
        )
        .await;

        let (status, found) = send(&router, get_request("/users?name=Bob")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], created["id"]);

        let (status, _) = send(&router, get_request("/users?name=Nobody")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, get_request("/users")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "name");
    }

    #[tokio::test]
    async fn test_verify_password_marks_user_active() {
        // Given a user created with a password
        let (router, _service) = test_router().await;
        let (status, created) = send(
            &router,
            json_request(
                "POST",
                "/users",
                json!({"name": "Carol", "password": "s3cret"}).to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("password").is_none());
        assert!(created.get("password_hash").is_none());
        let id = created["id"].as_i64().unwrap();
        let verify_uri = format!("/users/{id}/verify");

        // When verifying a wrong and then the right password
        let (status, wrong) = send(
            &router,
            json_request("POST", &verify_uri, json!({"password": "guess"}).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wrong["verified"], false);

        let (active_status, active_before) = send(&router, get_request("/users/active")).await;
        assert_eq!(active_status, StatusCode::OK);
        assert_eq!(active_before["active_users"], json!([]));

        let (status, right) = send(
            &router,
            json_request("POST", &verify_uri, json!({"password": "s3cret"}).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(right["verified"], true);

        // Then only the successful check shows up in the active list
        let (_, active) = send(&router, get_request("/users/active")).await;
        assert_eq!(active["active_users"], json!([id]));
    }

    #[tokio::test]
    async fn test_verify_unknown_user_is_404() {
        let (router, _service) = test_router().await;

        let (status, _) = send(
            &router,
            json_request("POST", "/users/424242/verify", json!({"password": "x"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_verify_requires_password_field() {
        let (router, _service) = test_router().await;

        let (status, body) = send(&router, json_request("POST", "/users/1/verify", "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "password");
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_without_detail() {
        // Given a service whose pool has been closed
        let (router, service) = test_router().await;
        service.close().await;

        // When creating a user
        let (status, body) = send(
            &router,
            json_request("POST", "/users", json!({"name": "Dave"}).to_string()),
        )
        .await;

        // Then the failure surfaces as a generic 500
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "storage_error");
        assert_eq!(body["error"]["message"], "Internal storage error");
    }
}
