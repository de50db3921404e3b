//! SQLite connection pool management
//!
//! SQLite has no row-level locks, so writers are serialized in-process by
//! [`SqliteDb::writer`] and run inside a transaction on a single connection.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tokio::sync::{Mutex, MutexGuard};

use super::DatabaseConfig;

/// SQLite pool plus the process-wide write lock
#[derive(Clone)]
pub struct SqliteDb {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl SqliteDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Hold for the whole of a read-modify-write transaction
    pub async fn writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create a new SQLite connection pool.
///
/// In-memory databases live per connection, so they get exactly one
/// connection that is never recycled.
pub async fn create_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if is_memory_url(&config.url) {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect_with(options.journal_mode(SqliteJournalMode::Wal))
        .await
}
