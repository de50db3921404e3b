//! SQLite repositories

mod admin;
mod endpoint_link;
mod member;
mod principal;

pub use admin::SqliteAdminRepository;
pub use endpoint_link::SqliteEndpointLinkRepository;
pub use member::SqliteMemberRepository;
pub use principal::SqlitePrincipalRepository;
