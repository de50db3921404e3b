//! # gate-core
//!
//! Domain layer for time-bounded membership grants: member records, the
//! binding reconciler, the confirmation/ban/expiry state machine, and the
//! ports (repository and platform traits) the outer layers implement.
//! This crate has zero dependencies on infrastructure (database, HTTP, etc.).

pub mod binding;
pub mod clock;
pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use binding::{BindingDecision, BindingOutcome, BindingRequest};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{
    render_csv, Admin, EndpointLink, ExportRow, Member, MemberStatus, Principal, PrincipalProfile,
    Transition, CSV_COLUMNS,
};
pub use error::{DeliveryError, DomainError, EndpointError};
pub use events::{NotificationKind, NotificationPayload};
pub use traits::{
    AdminRepository, EndpointClient, EndpointLinkRepository, MemberLookup, MemberRepository,
    Notifier, PrincipalRepository, RepoResult,
};
pub use value_objects::{
    EndpointId, ExportScope, GrantDuration, IdParseError, MemberKey, MembershipId,
    MembershipIdPolicy, PrincipalId,
};
