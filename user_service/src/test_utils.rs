//! Shared setup for the crate's unit tests
//!
//! Every helper builds its own store, so tests never share rows and can run in
//! parallel without coordination.

use std::time::Duration;

use tempfile::TempDir;

use crate::config::{CredentialConfig, ServiceConfig, StorageConfig};
use crate::service::UserService;
use crate::storage::StorageGateway;

/// Keeps digesting cheap in tests; production uses the configured default
pub const TEST_PBKDF2_ITERATIONS: u32 = 1_000;

/// Service configuration over a private in-memory database
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        storage: StorageConfig::in_memory(),
        credential: CredentialConfig {
            iterations: TEST_PBKDF2_ITERATIONS,
        },
        max_name_length: 32,
        ..ServiceConfig::default()
    }
}

/// In-memory gateway with the schema already created
pub async fn memory_gateway() -> StorageGateway {
    let gateway = StorageGateway::connect(&StorageConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    gateway
        .init_schema()
        .await
        .expect("Failed to create schema");
    gateway
}

pub async fn memory_service() -> UserService {
    UserService::new(test_config())
        .await
        .expect("Failed to build in-memory user service")
}

/// Service over a database file in a fresh temporary directory
///
/// The directory is removed when the returned guard is dropped.
pub async fn file_service() -> (UserService, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("users.db");

    let config = ServiceConfig {
        storage: StorageConfig {
            database_url: format!("sqlite:{}", path.display()),
            max_connections: 8,
            query_timeout: Duration::from_secs(30),
        },
        ..test_config()
    };

    let service = UserService::new(config)
        .await
        .expect("Failed to build file-backed user service");
    (service, dir)
}
