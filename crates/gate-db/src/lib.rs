//! # gate-db
//!
//! Database layer implementing the `gate-core` repository traits over two
//! engines via SQLx: PostgreSQL (networked) and SQLite (embedded file).
//!
//! ## Overview
//!
//! - Connection pool management and engine selection ([`Database`])
//! - Schema files applied at start-up
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, one set per engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_db::{Database, DatabaseConfig, Repositories};
//!
//! async fn example() -> Result<(), gate_core::DomainError> {
//!     let db = Database::connect(&DatabaseConfig::sqlite_memory()).await?;
//!     db.apply_schema().await?;
//!     let repos = Repositories::new(&db);
//!
//!     // Use the repositories...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

mod factory;

// Re-export commonly used types
pub use factory::Repositories;
pub use pool::{create_pool, create_sqlite_pool, Database, DatabaseConfig, PgPool, SqliteDb, SqlitePool};
pub use repositories::{
    PgAdminRepository, PgEndpointLinkRepository, PgMemberRepository, PgPrincipalRepository,
    SqliteAdminRepository, SqliteEndpointLinkRepository, SqliteMemberRepository,
    SqlitePrincipalRepository,
};
