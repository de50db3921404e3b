//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and orchestrates the
//! domain, storage and platform ports for one area.

pub mod admin;
pub mod context;
pub mod enforcer;
pub mod error;
pub mod join_link;
pub mod member_query;
pub mod membership;
pub mod notify;
pub mod session;
pub mod submission;

pub use admin::AdminService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use enforcer::{AccessEnforcer, EnforcementAction, EnforcementSummary};
pub use error::{ServiceError, ServiceResult};
pub use join_link::JoinLinkService;
pub use member_query::MemberQueryService;
pub use membership::{MembershipService, TransitionOutcome};
pub use notify::{Delivery, NotificationService};
pub use session::SessionTracker;
pub use submission::{SubmissionOutcome, SubmissionResult, SubmissionService};
