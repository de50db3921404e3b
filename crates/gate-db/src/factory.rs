//! Engine-independent repository set

use std::sync::Arc;

use gate_core::traits::{
    AdminRepository, EndpointLinkRepository, MemberRepository, PrincipalRepository,
};

use crate::pool::Database;
use crate::repositories::{
    PgAdminRepository, PgEndpointLinkRepository, PgMemberRepository, PgPrincipalRepository,
    SqliteAdminRepository, SqliteEndpointLinkRepository, SqliteMemberRepository,
    SqlitePrincipalRepository,
};

/// Every repository the application needs, backed by one engine
#[derive(Clone)]
pub struct Repositories {
    pub members: Arc<dyn MemberRepository>,
    pub principals: Arc<dyn PrincipalRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub links: Arc<dyn EndpointLinkRepository>,
}

impl Repositories {
    pub fn new(db: &Database) -> Self {
        match db {
            Database::Postgres(pool) => Self {
                members: Arc::new(PgMemberRepository::new(pool.clone())),
                principals: Arc::new(PgPrincipalRepository::new(pool.clone())),
                admins: Arc::new(PgAdminRepository::new(pool.clone())),
                links: Arc::new(PgEndpointLinkRepository::new(pool.clone())),
            },
            Database::Sqlite(db) => Self {
                members: Arc::new(SqliteMemberRepository::new(db.clone())),
                principals: Arc::new(SqlitePrincipalRepository::new(db.clone())),
                admins: Arc::new(SqliteAdminRepository::new(db.clone())),
                links: Arc::new(SqliteEndpointLinkRepository::new(db.clone())),
            },
        }
    }
}
