//! Membership service
//!
//! Administrative transitions on member records: confirm, decline, ban,
//! unban, kick and remove, plus the scheduler's expire. For admin actions
//! enforcement at the endpoints runs first and is best effort; the stored
//! transition always proceeds and the per-endpoint outcome is reported back.
//! Expiry commits its guarded decline before touching the endpoints. Records
//! without a principal skip enforcement and notification.

use chrono::{DateTime, Utc};
use gate_core::traits::MemberLookup;
use gate_core::{
    DomainError, GrantDuration, Member, NotificationKind, NotificationPayload, PrincipalId,
    Transition,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::admin::AdminService;
use super::context::ServiceContext;
use super::enforcer::{AccessEnforcer, EnforcementSummary};
use super::error::ServiceResult;
use super::join_link::JoinLinkService;
use super::notify::{Delivery, NotificationService};

/// Result of one transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    /// Record after the transition (before deletion, for `remove`)
    pub member: Member,
    /// Endpoint outcome, when the transition enforces anything
    pub enforcement: Option<EnforcementSummary>,
    pub notification: Delivery,
}

impl TransitionOutcome {
    fn new(member: Member) -> Self {
        Self {
            member,
            enforcement: None,
            notification: Delivery::Skipped,
        }
    }
}

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Lookup for an admin-supplied membership id, checked against the id pattern
    pub fn membership_lookup(&self, raw: &str) -> ServiceResult<MemberLookup> {
        Ok(MemberLookup::Membership(self.ctx.id_policy().validate(raw)?))
    }

    async fn load(&self, lookup: &MemberLookup) -> ServiceResult<Member> {
        self.ctx
            .member_repo()
            .find(lookup)
            .await?
            .ok_or_else(|| DomainError::MemberNotFound(lookup.to_string()).into())
    }

    async fn authorize(&self, actor: PrincipalId) -> ServiceResult<()> {
        AdminService::new(self.ctx).require_admin(actor).await
    }

    async fn notify(&self, member: &Member, kind: NotificationKind, payload: NotificationPayload) -> Delivery {
        match member.principal_id {
            Some(principal) => {
                let delivery = NotificationService::new(self.ctx)
                    .send(principal, kind, payload)
                    .await;
                self.ctx.sessions().clear(principal);
                delivery
            }
            None => Delivery::Skipped,
        }
    }

    /// Grant access for `duration`, extending any unexpired grant
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        actor: PrincipalId,
        lookup: &MemberLookup,
        duration: GrantDuration,
    ) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;
        let now = self.ctx.now();

        let member = self
            .ctx
            .member_repo()
            .apply_transition(lookup, Transition::Grant { duration, now })
            .await?;
        info!(
            membership_id = %member.membership_id,
            expires_at = ?member.expires_at,
            "Member confirmed"
        );

        let mut outcome = TransitionOutcome::new(member);
        if !outcome.member.is_orphaned() {
            let links = JoinLinkService::new(self.ctx).links_for_all_endpoints().await;
            let mut payload = NotificationPayload::for_membership(outcome.member.membership_id.clone())
                .with_expiry(outcome.member.expires_at)
                .with_links(links);
            if let Some(remaining) = outcome.member.status(now).remaining_seconds() {
                payload = payload.with_remaining(remaining);
            }
            outcome.notification = self
                .notify(&outcome.member, NotificationKind::AccessGranted, payload)
                .await;
        }
        Ok(outcome)
    }

    /// Withdraw confirmation and expiry; the ban flag is untouched
    #[instrument(skip(self))]
    pub async fn decline(
        &self,
        actor: PrincipalId,
        lookup: &MemberLookup,
    ) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;

        let member = self
            .ctx
            .member_repo()
            .apply_transition(lookup, Transition::Decline)
            .await?;
        info!(membership_id = %member.membership_id, "Member declined");

        let payload = NotificationPayload::for_membership(member.membership_id.clone());
        let mut outcome = TransitionOutcome::new(member);
        outcome.notification = self
            .notify(&outcome.member, NotificationKind::AccessDenied, payload)
            .await;
        Ok(outcome)
    }

    /// Ban at every endpoint, then mark banned (which also declines)
    #[instrument(skip(self))]
    pub async fn ban(&self, actor: PrincipalId, lookup: &MemberLookup) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;
        let current = self.load(lookup).await?;

        let enforcement = match current.principal_id {
            Some(principal) => Some(AccessEnforcer::new(self.ctx).ban(principal).await),
            None => None,
        };
        let member = self
            .ctx
            .member_repo()
            .apply_transition(&MemberLookup::Id(current.id), Transition::SetBan { banned: true })
            .await?;
        info!(membership_id = %member.membership_id, "Member banned");

        let payload = NotificationPayload::for_membership(member.membership_id.clone());
        let mut outcome = TransitionOutcome::new(member);
        outcome.enforcement = enforcement;
        outcome.notification = self
            .notify(&outcome.member, NotificationKind::Banned, payload)
            .await;
        Ok(outcome)
    }

    /// Lift the ban at every endpoint, then clear the flag
    #[instrument(skip(self))]
    pub async fn unban(
        &self,
        actor: PrincipalId,
        lookup: &MemberLookup,
    ) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;
        let current = self.load(lookup).await?;

        let enforcement = match current.principal_id {
            Some(principal) => Some(AccessEnforcer::new(self.ctx).unban(principal).await),
            None => None,
        };
        let member = self
            .ctx
            .member_repo()
            .apply_transition(&MemberLookup::Id(current.id), Transition::SetBan { banned: false })
            .await?;
        info!(membership_id = %member.membership_id, "Member unbanned");

        let mut outcome = TransitionOutcome::new(member);
        outcome.enforcement = enforcement;
        Ok(outcome)
    }

    /// Remove from every endpoint without a lasting ban, then decline
    #[instrument(skip(self))]
    pub async fn kick(&self, actor: PrincipalId, lookup: &MemberLookup) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;
        let current = self.load(lookup).await?;
        self.kick_and_decline(&current).await
    }

    /// Kick, then delete the member and its principal in one store call
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        actor: PrincipalId,
        lookup: &MemberLookup,
    ) -> ServiceResult<TransitionOutcome> {
        self.authorize(actor).await?;
        let current = self.load(lookup).await?;

        let enforcement = self.enforce_kick(&current).await;
        let member = self
            .ctx
            .member_repo()
            .remove(current.id)
            .await?
            .ok_or_else(|| DomainError::MemberNotFound(lookup.to_string()))?;
        if let Some(principal) = member.principal_id {
            self.ctx.sessions().clear(principal);
        }
        info!(membership_id = %member.membership_id, "Member removed");

        let mut outcome = TransitionOutcome::new(member);
        outcome.enforcement = enforcement;
        Ok(outcome)
    }

    /// Hard expiry of a grant that lapsed at or before `cutoff`.
    ///
    /// The decline is applied first and only if the stored grant is still
    /// due; a renewal that landed after `member` was read wins and `None` is
    /// returned with nothing sent or enforced. Otherwise the principal is
    /// told and removed from every endpoint, whatever the endpoints say.
    #[instrument(skip(self, member), fields(membership_id = %member.membership_id))]
    pub async fn expire(
        &self,
        member: &Member,
        cutoff: DateTime<Utc>,
    ) -> ServiceResult<Option<TransitionOutcome>> {
        let expired = match self
            .ctx
            .member_repo()
            .apply_transition(&MemberLookup::Id(member.id), Transition::Expire { cutoff })
            .await
        {
            Ok(expired) => expired,
            Err(DomainError::NoLongerDue(_)) => {
                info!("Grant renewed before expiry, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let payload = NotificationPayload::for_membership(expired.membership_id.clone())
            .with_expiry(member.expires_at);
        let notification = self
            .notify(&expired, NotificationKind::Expired, payload)
            .await;
        let enforcement = self.enforce_kick(&expired).await;
        info!("Member expired");

        let mut outcome = TransitionOutcome::new(expired);
        outcome.enforcement = enforcement;
        outcome.notification = notification;
        Ok(Some(outcome))
    }

    async fn enforce_kick(&self, member: &Member) -> Option<EnforcementSummary> {
        match member.principal_id {
            Some(principal) => Some(AccessEnforcer::new(self.ctx).kick(principal).await),
            None => None,
        }
    }

    async fn kick_and_decline(&self, current: &Member) -> ServiceResult<TransitionOutcome> {
        let enforcement = self.enforce_kick(current).await;
        let member = self
            .ctx
            .member_repo()
            .apply_transition(&MemberLookup::Id(current.id), Transition::Decline)
            .await?;
        info!(membership_id = %member.membership_id, "Member removed from endpoints");

        let mut outcome = TransitionOutcome::new(member);
        outcome.enforcement = enforcement;
        Ok(outcome)
    }
}
