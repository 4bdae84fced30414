//! Resolved configuration for the user service
//!
//! The core never reads the environment on its own initiative. Callers either build a
//! [`ServiceConfig`] by hand or call [`ServiceConfig::from_env`] once at startup.

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

/// Default SQLite location, relative to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite:secure_app.db";

/// Default upper bound on a user name, counted in characters
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

/// Default PBKDF2 work factor
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ACTIVE_USERS_CAPACITY: usize = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the Storage Gateway
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Deadline applied to every statement, including pool checkout
    pub query_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

impl StorageConfig {
    /// An in-memory database, mostly useful in tests
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}

/// Settings for the Credential Codec
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredentialConfig {
    pub iterations: u32,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub storage: StorageConfig,
    pub credential: CredentialConfig,
    pub max_name_length: usize,
    pub active_users_capacity: usize,
    /// Create the users table while building the service
    pub init_schema_on_start: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            credential: CredentialConfig::default(),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            active_users_capacity: DEFAULT_ACTIVE_USERS_CAPACITY,
            init_schema_on_start: true,
        }
    }
}

impl ServiceConfig {
    /// Resolve the configuration from process environment variables
    ///
    /// Unset variables fall back to their defaults. A variable that is set but cannot be
    /// parsed is an error rather than being silently replaced by the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage = StorageConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.storage.database_url),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            query_timeout: Duration::from_millis(parse_or(
                &lookup,
                "QUERY_TIMEOUT_MS",
                DEFAULT_QUERY_TIMEOUT_MS,
            )?),
        };

        if storage.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let iterations = parse_or(&lookup, "PBKDF2_ITERATIONS", DEFAULT_PBKDF2_ITERATIONS)?;
        if iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PBKDF2_ITERATIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            storage,
            credential: CredentialConfig { iterations },
            max_name_length: parse_or(&lookup, "MAX_NAME_LENGTH", DEFAULT_MAX_NAME_LENGTH)?,
            active_users_capacity: defaults.active_users_capacity,
            init_schema_on_start: parse_bool_or(&lookup, "INIT_DB_ON_START", true)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key,
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
