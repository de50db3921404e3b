//! PostgreSQL repositories

mod admin;
mod endpoint_link;
mod member;
mod principal;

pub use admin::PgAdminRepository;
pub use endpoint_link::PgEndpointLinkRepository;
pub use member::PgMemberRepository;
pub use principal::PgPrincipalRepository;
