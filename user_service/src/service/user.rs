use std::sync::Arc;

use serde::Serialize;

use super::errors::UserError;
use super::validation::{validate_name, validate_password};
use crate::active::ActiveUsers;
use crate::config::ServiceConfig;
use crate::credential::CredentialCodec;
use crate::storage::{StorageError, StorageGateway};
use crate::userdb::{User, UserStore};

/// Result of a health probe against the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Degraded { reason: String },
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Stateless orchestrator over the Storage Gateway
///
/// Cheap to clone and safe to share between request tasks. Identity assignment is left
/// entirely to the store's auto-increment; the service keeps no counter of its own.
#[derive(Clone, Debug)]
pub struct UserService {
    store: UserStore,
    codec: CredentialCodec,
    active: Arc<ActiveUsers>,
    max_name_length: usize,
}

impl UserService {
    /// Connect to the configured store and, if requested, create the schema
    pub async fn new(config: ServiceConfig) -> Result<Self, UserError> {
        let gateway = StorageGateway::connect(&config.storage).await?;
        if config.init_schema_on_start {
            gateway.init_schema().await?;
        }
        Self::with_gateway(gateway, &config)
    }

    /// Build the service over an already connected gateway
    pub fn with_gateway(gateway: StorageGateway, config: &ServiceConfig) -> Result<Self, UserError> {
        let codec = CredentialCodec::new(config.credential)?;

        tracing::info!(
            "User service ready: max_name_length={}, pbkdf2_iterations={}",
            config.max_name_length,
            codec.iterations()
        );

        Ok(Self {
            store: UserStore::new(gateway),
            codec,
            active: Arc::new(ActiveUsers::new(config.active_users_capacity)),
            max_name_length: config.max_name_length,
        })
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Create a user, optionally with a password
    ///
    /// Input is validated before any storage call. The password, if any, is digested on
    /// the blocking pool and only the digest is written.
    pub async fn create_user(
        &self,
        name: &str,
        raw_password: Option<&str>,
    ) -> Result<User, UserError> {
        let name = validate_name(name, self.max_name_length).map_err(UserError::log)?;

        let password_hash = match raw_password {
            Some(password) => {
                validate_password(password).map_err(UserError::log)?;
                Some(self.hash_off_runtime(password.to_string()).await?)
            }
            None => None,
        };

        let id = self
            .store
            .insert_user(&name, password_hash)
            .await
            .map_err(|e| UserError::from(e).log())?;

        tracing::info!("User created: id={}, name={}", id, truncate(&name, 20));

        // The row was committed above; a miss here means it vanished underneath us.
        self.store
            .get_user(id)
            .await
            .map_err(|e| UserError::from(e).log())?
            .ok_or_else(|| {
                UserError::Storage(StorageError::Query(format!(
                    "user {id} missing right after insert"
                )))
                .log()
            })
    }

    pub async fn get_user(&self, id: i64) -> Result<User, UserError> {
        if id <= 0 {
            return Err(UserError::NotFound.log());
        }

        tracing::debug!("Looking up user {}", id);
        self.store
            .get_user(id)
            .await
            .map_err(|e| UserError::from(e).log())?
            .ok_or_else(|| UserError::NotFound.log())
    }

    /// Look up the earliest user registered under `name`
    pub async fn get_user_by_name(&self, name: &str) -> Result<User, UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::NotFound.log());
        }

        tracing::debug!("Looking up user by name {}", truncate(name, 20));
        self.store
            .get_user_by_name(name)
            .await
            .map_err(|e| UserError::from(e).log())?
            .ok_or_else(|| UserError::NotFound.log())
    }

    /// Check a password against the stored digest of user `id`
    ///
    /// A user created without a password never verifies. A successful check marks the
    /// user active.
    pub async fn verify_password(&self, id: i64, raw_password: &str) -> Result<bool, UserError> {
        if id <= 0 {
            return Err(UserError::NotFound.log());
        }

        let credential = self
            .store
            .get_credential(id)
            .await
            .map_err(|e| UserError::from(e).log())?
            .ok_or_else(|| UserError::NotFound.log())?;

        let Some(digest) = credential.password_hash else {
            tracing::debug!("User {} has no stored password", credential.id);
            return Ok(false);
        };

        let codec = self.codec.clone();
        let password = raw_password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || codec.verify(&password, &digest)).await?;

        if verified {
            self.active.mark_active(credential.id);
            tracing::debug!("Password verified for user {}", credential.id);
        } else {
            tracing::debug!("Password mismatch for user {}", credential.id);
        }
        Ok(verified)
    }

    /// Recently verified user ids, oldest first
    pub fn active_users(&self) -> Vec<i64> {
        self.active.snapshot()
    }

    pub async fn count_users(&self) -> Result<i64, UserError> {
        self.store
            .count_users()
            .await
            .map_err(|e| UserError::from(e).log())
    }

    /// Probe the store with a trivial round trip; never mutates anything
    pub async fn health_check(&self) -> Health {
        match self.store.gateway().ping().await {
            Ok(()) => Health::Healthy,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                Health::Degraded {
                    reason: "database unreachable".to_string(),
                }
            }
        }
    }

    /// Close the underlying pool; later calls fail with a storage error
    pub async fn close(&self) {
        self.store.gateway().close().await;
    }

    async fn hash_off_runtime(&self, password: String) -> Result<String, UserError> {
        let codec = self.codec.clone();
        let digest = tokio::task::spawn_blocking(move || codec.hash(&password))
            .await
            .map_err(|e| UserError::from(e).log())?
            .map_err(|e| UserError::from(e).log())?;
        Ok(digest)
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
