use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// Store unreachable, pool closed or misconfigured
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Malformed statement or undecodable row
    #[error("Query error: {0}")]
    Query(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("No matching row")]
    NotFound,
}

impl StorageError {
    /// Log the error with the severity it deserves and hand it back
    pub fn log(self) -> Self {
        match &self {
            Self::Connection(msg) => tracing::error!("Storage connection error: {}", msg),
            Self::ConstraintViolation(msg) => tracing::warn!("Constraint violation: {}", msg),
            Self::Query(msg) => tracing::error!("Query error: {}", msg),
            Self::Timeout => tracing::error!("Storage operation timed out"),
            Self::NotFound => tracing::debug!("No matching row"),
        }
        self
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_NOTADB: i32 = 26;

/// Primary result code; SQLite reports extended codes whose low byte is the primary one
fn sqlite_primary_code(db_err: &dyn sqlx::error::DatabaseError) -> Option<i32> {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff)
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut => Self::Timeout,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                    || matches!(db_err.kind(), sqlx::error::ErrorKind::NotNullViolation)
                {
                    Self::ConstraintViolation(db_err.message().to_string())
                } else if let Some(code) = sqlite_primary_code(db_err.as_ref()) {
                    match code {
                        SQLITE_BUSY | SQLITE_LOCKED => Self::Timeout,
                        SQLITE_CANTOPEN | SQLITE_NOTADB => {
                            Self::Connection(db_err.message().to_string())
                        }
                        _ => Self::Query(db_err.message().to_string()),
                    }
                } else {
                    Self::Query(db_err.message().to_string())
                }
            }
            sqlx::Error::Io(e) => Self::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Self::Connection(e.to_string()),
            sqlx::Error::Configuration(e) => Self::Connection(e.to_string()),
            sqlx::Error::PoolClosed => Self::Connection("connection pool is closed".to_string()),
            sqlx::Error::WorkerCrashed => {
                Self::Connection("database worker thread crashed".to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}
