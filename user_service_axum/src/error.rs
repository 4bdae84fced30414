use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use http::StatusCode;
use serde::Serialize;

use user_service::UserError;

/// Body of every error response: `{"error": {"code", "message", "field"?}}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

pub(crate) fn error_response(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    field: Option<&'static str>,
) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            error: ErrorDetail {
                code,
                message: message.into(),
                field,
            },
        }),
    )
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

/// Map each UserError variant to exactly one status code
///
/// Server-side faults get a fixed message; their detail has already been logged.
impl<T> IntoResponseError<T> for Result<T, UserError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            let code = e.code();
            match e {
                UserError::Validation { field, .. } => {
                    error_response(StatusCode::BAD_REQUEST, code, e.to_string(), Some(field))
                }
                UserError::NotFound => {
                    error_response(StatusCode::NOT_FOUND, code, "User not found", None)
                }
                UserError::Conflict(_) => error_response(
                    StatusCode::CONFLICT,
                    code,
                    "User conflicts with an existing record",
                    None,
                ),
                UserError::Storage(_) => error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "Internal storage error",
                    None,
                ),
                UserError::Credential(_) => error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "Internal error",
                    None,
                ),
            }
        })
    }
}

/// Malformed bodies become 400s, oversized ones keep their 413
impl<T> IntoResponseError<T> for Result<T, JsonRejection> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "payload_too_large",
                    "Request body too large",
                    None,
                )
            } else {
                error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    rejection.body_text(),
                    None,
                )
            }
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, PathRejection> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|rejection| {
            error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                rejection.body_text(),
                Some("id"),
            )
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, QueryRejection> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|rejection| {
            error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                rejection.body_text(),
                None,
            )
        })
    }
}
