//! Database connection pool management
//!
//! One [`Database`] handle per process, selected by [`DatabaseBackend`] at
//! start-up. Both engines expose the same repositories through
//! [`crate::Repositories`].

mod postgres;
mod sqlite;

use std::time::Duration;

use gate_common::DatabaseBackend;
use gate_core::DomainError;
use tracing::info;

use crate::repositories::map_db_error;

pub use postgres::create_pool;
pub use sqlite::{create_sqlite_pool, SqliteDb};

// Re-export pool types for convenience
pub use sqlx::postgres::PgPool;
pub use sqlx::sqlite::SqlitePool;

/// Database configuration for connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Connection URL (`postgres://...` or `sqlite://...`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: String::from("sqlite://gatekeeper.db?mode=rwc"),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DatabaseConfig {
    /// In-memory SQLite store (tests, demos)
    pub fn sqlite_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            ..Default::default()
        }
    }
}

impl From<&gate_common::DatabaseConfig> for DatabaseConfig {
    fn from(config: &gate_common::DatabaseConfig) -> Self {
        Self {
            backend: config.backend,
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Default::default()
        }
    }
}

/// Open database handle for the configured engine
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqliteDb),
}

impl Database {
    /// Connect to the configured engine
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let db = match config.backend {
            DatabaseBackend::Postgres => {
                Self::Postgres(create_pool(config).await.map_err(map_db_error)?)
            }
            DatabaseBackend::Sqlite => {
                Self::Sqlite(SqliteDb::new(create_sqlite_pool(config).await.map_err(map_db_error)?))
            }
        };
        info!(backend = db.backend_name(), "Database connected");
        Ok(db)
    }

    /// Create tables and indexes if they do not exist
    pub async fn apply_schema(&self) -> Result<(), DomainError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::raw_sql(include_str!("../../schema/postgres.sql"))
                    .execute(pool)
                    .await
                    .map_err(map_db_error)?;
            }
            Self::Sqlite(db) => {
                sqlx::raw_sql(include_str!("../../schema/sqlite.sql"))
                    .execute(db.pool())
                    .await
                    .map_err(map_db_error)?;
            }
        }
        Ok(())
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<(), DomainError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await.map_err(map_db_error)?;
            }
            Self::Sqlite(db) => {
                sqlx::query("SELECT 1")
                    .execute(db.pool())
                    .await
                    .map_err(map_db_error)?;
            }
        }
        Ok(())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_app_config() {
        let app = gate_common::DatabaseConfig {
            backend: DatabaseBackend::Postgres,
            url: "postgres://localhost/gate".to_string(),
            max_connections: 4,
            min_connections: 2,
        };
        let config = DatabaseConfig::from(&app);
        assert_eq!(config.backend, DatabaseBackend::Postgres);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_sqlite_memory_schema_and_ping() {
        let db = Database::connect(&DatabaseConfig::sqlite_memory()).await.unwrap();
        db.apply_schema().await.unwrap();
        db.apply_schema().await.unwrap();
        db.ping().await.unwrap();
        assert_eq!(db.backend_name(), "sqlite");
    }
}
