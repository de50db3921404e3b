//! Binding reconciler
//!
//! Decides how a claimed membership id and a principal are merged into the
//! member table, given the (at most two) rows currently owning either key.
//! The decision is pure; storage engines apply it inside one transaction.

use crate::entities::{Member, PrincipalProfile};
use crate::value_objects::MembershipId;

/// A principal's claim on a membership id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRequest {
    pub membership_id: MembershipId,
    pub principal: PrincipalProfile,
    /// Confirmation used only when a new record is created
    pub initial_confirmed: bool,
}

/// How the claim is applied to existing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingDecision {
    /// Neither key is on file
    Create,
    /// Only the membership id is on file: attach the principal to that row
    RebindPrincipal { member_id: i64 },
    /// Only the principal is on file: move its row to the new membership id
    RebindMembership { member_id: i64 },
    /// Both keys are on file in different rows: detach the principal from
    /// `detached_id` and attach it to `member_id`
    ResolveConflict { member_id: i64, detached_id: i64 },
    /// Both keys already belong to the same row
    NoOp { member_id: i64 },
}

impl BindingDecision {
    /// Decide from the ids of the rows keyed by membership id and by principal
    pub fn decide(by_membership: Option<i64>, by_principal: Option<i64>) -> Self {
        match (by_membership, by_principal) {
            (None, None) => Self::Create,
            (Some(member_id), None) => Self::RebindPrincipal { member_id },
            (None, Some(member_id)) => Self::RebindMembership { member_id },
            (Some(a), Some(b)) if a == b => Self::NoOp { member_id: a },
            (Some(member_id), Some(detached_id)) => Self::ResolveConflict {
                member_id,
                detached_id,
            },
        }
    }

    /// Row that ends up owning both keys, if it already exists
    pub fn target(&self) -> Option<i64> {
        match *self {
            Self::Create => None,
            Self::RebindPrincipal { member_id }
            | Self::RebindMembership { member_id }
            | Self::ResolveConflict { member_id, .. }
            | Self::NoOp { member_id } => Some(member_id),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::RebindPrincipal { .. } => "rebind_principal",
            Self::RebindMembership { .. } => "rebind_membership",
            Self::ResolveConflict { .. } => "resolve_conflict",
            Self::NoOp { .. } => "no_op",
        }
    }
}

/// Result of applying a binding: the decision taken and the resulting row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOutcome {
    pub decision: BindingDecision,
    pub member: Member,
}
