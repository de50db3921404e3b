//! Value objects - immutable types that represent domain concepts

mod export_scope;
mod grant;
mod ids;
mod member_key;
mod membership_id;

pub use export_scope::ExportScope;
pub use grant::GrantDuration;
pub use ids::{EndpointId, IdParseError, PrincipalId};
pub use member_key::MemberKey;
pub use membership_id::{MembershipId, MembershipIdPolicy};
