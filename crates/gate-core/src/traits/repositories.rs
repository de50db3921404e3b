//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides one implementation per storage engine. Every mutation is atomic
//! per call and serializes against concurrent callers touching the same
//! membership id or principal.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::binding::{BindingOutcome, BindingRequest};
use crate::entities::{Admin, EndpointLink, ExportRow, Member, Principal, PrincipalProfile, Transition};
use crate::error::DomainError;
use crate::value_objects::{EndpointId, ExportScope, MembershipId, PrincipalId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Which key a member row is addressed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberLookup {
    Id(i64),
    Membership(MembershipId),
    Principal(PrincipalId),
}

impl fmt::Display for MemberLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Membership(id) => write!(f, "{id}"),
            Self::Principal(id) => write!(f, "principal {id}"),
        }
    }
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find member by row id
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Member>>;

    /// Find member by membership id
    async fn find_by_membership_id(&self, membership_id: &MembershipId)
        -> RepoResult<Option<Member>>;

    /// Find member bound to a principal
    async fn find_by_principal(&self, principal_id: PrincipalId) -> RepoResult<Option<Member>>;

    /// Find member by its principal's handle (leading `@` ignored)
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Member>>;

    /// Refresh the principal profile and reconcile the claim with existing rows
    async fn upsert_binding(&self, request: &BindingRequest) -> RepoResult<BindingOutcome>;

    /// Load the row under lock, apply the transition and persist it.
    /// Fails with `MemberNotFound` when no row matches.
    async fn apply_transition(
        &self,
        lookup: &MemberLookup,
        transition: Transition,
    ) -> RepoResult<Member>;

    /// All members, ordered by row id
    async fn list_all(&self) -> RepoResult<Vec<Member>>;

    /// Confirmed members with a principal, no warning yet, and
    /// `0 < expires_at - now <= lead`
    async fn due_for_warning(&self, now: DateTime<Utc>, lead: Duration)
        -> RepoResult<Vec<Member>>;

    /// Confirmed members with a principal, no grace notice yet, and
    /// `0 <= now - expires_at <= grace`
    async fn due_for_grace_notice(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> RepoResult<Vec<Member>>;

    /// Confirmed members with `expires_at <= cutoff`
    async fn due_for_hard_expiry(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Member>>;

    /// Delete a member row together with its principal in one transaction.
    /// Returns the record as it was before deletion, or `None` if absent.
    async fn remove(&self, id: i64) -> RepoResult<Option<Member>>;

    // ------------------------------------------------------------------------
    // Provided
    // ------------------------------------------------------------------------

    async fn find(&self, lookup: &MemberLookup) -> RepoResult<Option<Member>> {
        match lookup {
            MemberLookup::Id(id) => self.find_by_id(*id).await,
            MemberLookup::Membership(id) => self.find_by_membership_id(id).await,
            MemberLookup::Principal(id) => self.find_by_principal(*id).await,
        }
    }

    async fn set_confirmation(
        &self,
        membership_id: &MembershipId,
        confirmed: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<Member> {
        self.apply_transition(
            &MemberLookup::Membership(membership_id.clone()),
            Transition::SetConfirmation {
                confirmed,
                expires_at,
            },
        )
        .await
    }

    async fn set_ban(&self, membership_id: &MembershipId, banned: bool) -> RepoResult<Member> {
        self.apply_transition(
            &MemberLookup::Membership(membership_id.clone()),
            Transition::SetBan { banned },
        )
        .await
    }

    async fn set_confirmation_by_principal(
        &self,
        principal_id: PrincipalId,
        confirmed: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<Member> {
        self.apply_transition(
            &MemberLookup::Principal(principal_id),
            Transition::SetConfirmation {
                confirmed,
                expires_at,
            },
        )
        .await
    }

    async fn set_ban_by_principal(
        &self,
        principal_id: PrincipalId,
        banned: bool,
    ) -> RepoResult<Member> {
        self.apply_transition(
            &MemberLookup::Principal(principal_id),
            Transition::SetBan { banned },
        )
        .await
    }

    /// Members in `scope`, each with its status derived at `now`
    async fn list_for_export(
        &self,
        scope: ExportScope,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<ExportRow>> {
        let members = self.list_all().await?;
        Ok(members
            .iter()
            .filter(|m| scope.matches(m, now))
            .map(|m| ExportRow::from_member(m, now))
            .collect())
    }
}

// ============================================================================
// Principal Repository
// ============================================================================

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Create or refresh a principal (handle and display name, last write wins)
    async fn upsert_profile(&self, profile: &PrincipalProfile) -> RepoResult<Principal>;

    async fn find(&self, id: PrincipalId) -> RepoResult<Option<Principal>>;

    async fn get_locale(&self, id: PrincipalId) -> RepoResult<Option<String>>;

    /// Set the preferred locale, creating the principal if needed
    async fn set_locale(&self, id: PrincipalId, locale: &str) -> RepoResult<()>;

    /// Delete a principal. Member rows bound to it become orphans.
    async fn delete(&self, id: PrincipalId) -> RepoResult<bool>;
}

// ============================================================================
// Admin Repository
// ============================================================================

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn is_admin(&self, id: PrincipalId) -> RepoResult<bool>;

    async fn find(&self, id: PrincipalId) -> RepoResult<Option<Admin>>;

    /// Grant or update the admin role
    async fn add(&self, id: PrincipalId, is_top_level: bool) -> RepoResult<Admin>;

    async fn remove(&self, id: PrincipalId) -> RepoResult<bool>;

    async fn list(&self) -> RepoResult<Vec<Admin>>;
}

// ============================================================================
// Endpoint Link Repository
// ============================================================================

#[async_trait]
pub trait EndpointLinkRepository: Send + Sync {
    async fn get(&self, endpoint_id: EndpointId) -> RepoResult<Option<EndpointLink>>;

    /// Insert or replace the cached link
    async fn upsert(&self, endpoint_id: EndpointId, link: &str) -> RepoResult<EndpointLink>;
}
