//! Error types for the user service layer

use thiserror::Error;

use crate::credential::CredentialError;
use crate::storage::StorageError;

/// Everything a user service operation can fail with
///
/// Each variant maps to exactly one stable [`code`](UserError::code), so adapters can
/// branch on it without parsing messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UserError {
    /// Client input failed validation; nothing was written
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("User not found")]
    NotFound,

    /// The store rejected the write because of a constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Credential error: {0}")]
    Credential(CredentialError),
}

impl UserError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable identifier for the error class
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Storage(StorageError::Timeout) => "storage_timeout",
            Self::Storage(_) => "storage_error",
            Self::Credential(_) => "credential_error",
        }
    }

    /// Log the error and hand it back
    ///
    /// Client mistakes are logged at debug level; server faults at error level.
    pub fn log(self) -> Self {
        match &self {
            Self::Validation { field, reason } => {
                tracing::debug!("Validation failed for {}: {}", field, reason)
            }
            Self::NotFound => tracing::debug!("User not found"),
            Self::Conflict(msg) => tracing::warn!("Conflict: {}", msg),
            Self::Storage(e) => tracing::error!("Storage error: {}", e),
            Self::Credential(e) => tracing::error!("Credential error: {}", e),
        }
        self
    }
}

impl From<StorageError> for UserError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::ConstraintViolation(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<CredentialError> for UserError {
    fn from(err: CredentialError) -> Self {
        Self::Credential(err)
    }
}

impl From<tokio::task::JoinError> for UserError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Credential(CredentialError::Crypto(format!(
            "Credential task failed: {err}"
        )))
    }
}
