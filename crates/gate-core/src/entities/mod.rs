//! Domain entities

mod admin;
mod endpoint_link;
mod export;
mod member;
mod principal;

pub use admin::Admin;
pub use endpoint_link::EndpointLink;
pub use export::{render_csv, ExportRow, CSV_COLUMNS};
pub use member::{Member, MemberStatus, Transition};
pub use principal::{Principal, PrincipalProfile};
