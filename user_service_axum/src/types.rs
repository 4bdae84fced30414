//! Request and response bodies
//!
//! Every field a client may omit is an `Option`, so a missing field reaches the handler
//! as a validation failure instead of a deserialization error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateUserRequest {
    pub(crate) name: Option<String>,
    pub(crate) password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VerifyPasswordRequest {
    pub(crate) password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameQuery {
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyPasswordResponse {
    pub(crate) verified: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActiveUsersResponse {
    pub(crate) active_users: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}
