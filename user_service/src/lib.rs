//! user_service - user creation and lookup over a relational store
//!
//! The crate is built from three layers:
//!
//! - the Storage Gateway ([`StorageGateway`]), which owns the connection pool and only
//!   runs parameterized statements;
//! - the Credential Codec ([`CredentialCodec`]), which produces and checks salted
//!   PBKDF2 digests;
//! - the User Service ([`UserService`]), which validates input and orchestrates the two.
//!
//! HTTP concerns live in the `user-service-axum` crate.

mod active;
mod config;
mod credential;
mod service;
mod storage;
mod userdb;

#[cfg(test)]
mod test_utils;

pub use active::ActiveUsers;
pub use config::{
    ConfigError, CredentialConfig, DEFAULT_DATABASE_URL, DEFAULT_MAX_NAME_LENGTH,
    DEFAULT_PBKDF2_ITERATIONS, ServiceConfig, StorageConfig,
};
pub use credential::{CredentialCodec, CredentialError, DIGEST_SCHEME};
pub use service::{
    Health, MAX_PASSWORD_BYTES, UserError, UserService, validate_name, validate_password,
};
pub use storage::{SqlValue, StorageError, StorageGateway};
pub use userdb::User;
