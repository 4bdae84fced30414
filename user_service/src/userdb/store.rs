use sqlx::{FromRow, Row};

use super::types::{StoredCredential, User};
use crate::storage::{SqlValue, StorageError, StorageGateway};

/// Statements against the users table, issued through the Storage Gateway
#[derive(Clone, Debug)]
pub(crate) struct UserStore {
    gateway: StorageGateway,
}

impl UserStore {
    pub(crate) fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    pub(crate) fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    /// Insert a user row; the store assigns and returns the id
    pub(crate) async fn insert_user(
        &self,
        name: &str,
        password_hash: Option<String>,
    ) -> Result<i64, StorageError> {
        self.gateway
            .insert(
                "INSERT INTO users (name, password_hash) VALUES (?, ?)",
                &[name.into(), password_hash.into()],
            )
            .await
    }

    pub(crate) async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let row = self
            .gateway
            .query_optional(
                "SELECT id, name, created_at FROM users WHERE id = ?",
                &[id.into()],
            )
            .await?;

        row.map(|row| User::from_row(&row).map_err(StorageError::from))
            .transpose()
    }

    /// Lowest-id user with exactly this name
    pub(crate) async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, StorageError> {
        let row = self
            .gateway
            .query_optional(
                "SELECT id, name, created_at FROM users WHERE name = ? ORDER BY id LIMIT 1",
                &[name.into()],
            )
            .await?;

        row.map(|row| User::from_row(&row).map_err(StorageError::from))
            .transpose()
    }

    pub(crate) async fn get_credential(
        &self,
        id: i64,
    ) -> Result<Option<StoredCredential>, StorageError> {
        let row = self
            .gateway
            .query_optional(
                "SELECT id, password_hash FROM users WHERE id = ?",
                &[SqlValue::Integer(id)],
            )
            .await?;

        row.map(|row| StoredCredential::from_row(&row).map_err(StorageError::from))
            .transpose()
    }

    pub(crate) async fn count_users(&self) -> Result<i64, StorageError> {
        let row = self
            .gateway
            .query_one("SELECT COUNT(*) AS n FROM users", &[])
            .await?;

        row.try_get::<i64, _>("n").map_err(StorageError::from)
    }
}
