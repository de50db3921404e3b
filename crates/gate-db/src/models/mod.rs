//! Database models - SQLx-compatible structs for the store tables
//!
//! PostgreSQL models carry `TIMESTAMPTZ` columns as `DateTime<Utc>`; the
//! SQLite models carry unix seconds.

mod admin;
mod endpoint_link;
mod member;
mod principal;

pub use admin::{AdminModel, SqliteAdminModel};
pub use endpoint_link::{EndpointLinkModel, SqliteEndpointLinkModel};
pub use member::{MemberModel, SqliteMemberModel};
pub use principal::{PrincipalModel, SqlitePrincipalModel};
