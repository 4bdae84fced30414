use std::{future::Future, str::FromStr, time::Duration};

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};

use super::errors::StorageError;
use super::schema::SCHEMA_STATEMENTS;
use super::types::{SqlValue, bind_all};
use crate::config::StorageConfig;

/// Sole owner of the connection pool to the relational store
///
/// Every operation checks out a pooled connection (or a transaction guard) for its own
/// duration. Both are returned to the pool when dropped, so early returns, errors and
/// deadline cancellation all release the handle; a dropped transaction that was never
/// committed is rolled back.
#[derive(Clone, Debug)]
pub struct StorageGateway {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl StorageGateway {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let in_memory = is_in_memory_url(&config.database_url);

        let mut opts = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| StorageError::Connection(e.to_string()).log())?
            .create_if_missing(true)
            .busy_timeout(config.query_timeout);
        if !in_memory {
            opts = opts.journal_mode(SqliteJournalMode::Wal);
        }

        // Each connection to ":memory:" is its own database, so an in-memory store is
        // pinned to one connection that is never recycled.
        let pool_opts = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_opts
            .acquire_timeout(config.query_timeout)
            .connect_with(opts)
            .await
            .map_err(|e| StorageError::from(e).log())?;

        tracing::info!(
            "Connected to database: url={}, in_memory={}",
            config.database_url,
            in_memory
        );

        Ok(Self {
            pool,
            query_timeout: config.query_timeout,
        })
    }

    /// Create the users table if it does not exist yet
    ///
    /// Idempotent, and safe to run from several tasks at once.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        self.with_deadline(async {
            let mut conn = self.pool.acquire().await?;
            for statement in SCHEMA_STATEMENTS {
                sqlx::query(statement).execute(&mut *conn).await?;
            }
            Ok(())
        })
        .await?;

        tracing::debug!("Database schema initialized");
        Ok(())
    }

    /// Run a parameterized write in its own transaction and return the affected row count
    pub async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<u64, StorageError> {
        self.with_deadline(async {
            let mut tx = self.pool.begin().await?;
            let result = bind_all(sqlx::query(statement), params)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(result.rows_affected())
        })
        .await
    }

    /// Run a parameterized single-row insert and return the id the store assigned to it
    pub async fn insert(&self, statement: &str, params: &[SqlValue]) -> Result<i64, StorageError> {
        self.with_deadline(async {
            let mut tx = self.pool.begin().await?;
            let result = bind_all(sqlx::query(statement), params)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() != 1 {
                return Err(StorageError::Query(format!(
                    "insert affected {} rows, expected 1",
                    result.rows_affected()
                )));
            }
            let id = result.last_insert_rowid();
            tx.commit().await?;
            Ok(id)
        })
        .await
    }

    /// Run a parameterized read expecting exactly one row
    pub async fn query_one(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<SqliteRow, StorageError> {
        self.query_optional(statement, params)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Run a parameterized read expecting at most one row
    pub async fn query_optional(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Option<SqliteRow>, StorageError> {
        self.with_deadline(async {
            let row = bind_all(sqlx::query(statement), params)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        })
        .await
    }

    /// Trivial round trip used to probe reachability
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.query_one("SELECT 1", &[]).await.map(|_| ())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn with_query_timeout(&self, query_timeout: Duration) -> Self {
        Self {
            pool: self.pool.clone(),
            query_timeout,
        }
    }

    async fn with_deadline<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.query_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StorageError::NotFound)) => Err(StorageError::NotFound),
            Ok(Err(e)) => Err(e.log()),
            Err(_) => Err(StorageError::Timeout.log()),
        }
    }
}

fn is_in_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
