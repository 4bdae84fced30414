use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted user as seen outside the service
///
/// Carries no credential material; the stored digest is only ever read into
/// [`StoredCredential`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Store-assigned identity, immutable once assigned
    pub id: i64,
    pub name: String,
    /// When the store persisted the row
    pub created_at: DateTime<Utc>,
}

/// The digest column of a user row, loaded only for verification
#[derive(Clone, FromRow)]
pub(crate) struct StoredCredential {
    pub(crate) id: i64,
    pub(crate) password_hash: Option<String>,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("id", &self.id)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_without_credentials() {
        // Given a user
        let user = User {
            id: 7,
            name: "Alice".to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        // When serializing it
        let json = serde_json::to_value(&user).unwrap();

        // Then only the public fields are present
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["created_at"], "2024-05-01T10:00:00Z");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_stored_credential_debug_redacts_digest() {
        let credential = StoredCredential {
            id: 1,
            password_hash: Some("pbkdf2-sha256$1000$c2FsdA$a2V5".to_string()),
        };

        let debug = format!("{credential:?}");

        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("a2V5"));
    }
}
