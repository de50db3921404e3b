//! Repository implementations
//!
//! One implementation of each `gate-core` repository trait per engine.

mod error;
mod postgres;
mod sqlite;

pub(crate) use error::map_db_error;

pub use postgres::{
    PgAdminRepository, PgEndpointLinkRepository, PgMemberRepository, PgPrincipalRepository,
};
pub use sqlite::{
    SqliteAdminRepository, SqliteEndpointLinkRepository, SqliteMemberRepository,
    SqlitePrincipalRepository,
};
