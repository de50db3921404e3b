//! Submission service
//!
//! A principal submits a membership id; the claim is reconciled with the
//! store and the caller learns whether access is granted, pending, or
//! refused. Join requests at an endpoint are approved from the same record.

use gate_core::{
    BindingDecision, BindingRequest, Member, NotificationKind, NotificationPayload, PrincipalId,
    PrincipalProfile,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::join_link::JoinLinkService;
use super::notify::NotificationService;

/// What the submitting principal is told
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Banned,
    /// Access is current; links to every reachable endpoint
    Granted { links: Vec<String> },
    /// Waiting for an administrator. `known` is whether the id was on file.
    PendingApproval { known: bool },
}

#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub outcome: SubmissionOutcome,
    pub decision: BindingDecision,
    pub member: Member,
}

/// Submission service
pub struct SubmissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SubmissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, profile), fields(principal = %profile.id))]
    pub async fn submit(
        &self,
        profile: PrincipalProfile,
        raw_id: &str,
    ) -> ServiceResult<SubmissionResult> {
        let membership_id = self.ctx.id_policy().validate(raw_id)?;
        let principal = profile.id;
        let now = self.ctx.now();
        self.ctx.sessions().touch(principal, now);

        let existing = self
            .ctx
            .member_repo()
            .find_by_membership_id(&membership_id)
            .await?;
        let known = existing.is_some();

        let request = BindingRequest {
            membership_id,
            principal: profile,
            initial_confirmed: existing.is_some_and(|m| m.is_confirmed),
        };
        let binding = self.ctx.member_repo().upsert_binding(&request).await?;
        let member = binding.member;

        let outcome = if member.is_banned {
            SubmissionOutcome::Banned
        } else if member.admits(now) {
            let links = JoinLinkService::new(self.ctx).links_for_all_endpoints().await;
            SubmissionOutcome::Granted { links }
        } else {
            self.request_approval(&member, principal).await;
            SubmissionOutcome::PendingApproval { known }
        };

        info!(
            membership_id = %member.membership_id,
            decision = binding.decision.as_str(),
            outcome = ?outcome,
            "Submission processed"
        );

        Ok(SubmissionResult {
            outcome,
            decision: binding.decision,
            member,
        })
    }

    /// Tell the root admin a decision is needed
    async fn request_approval(&self, member: &Member, principal: PrincipalId) {
        if let Some(root) = self.ctx.root_admin() {
            let payload = NotificationPayload::for_membership(member.membership_id.clone())
                .requested_by(principal);
            NotificationService::new(self.ctx)
                .send(root, NotificationKind::ApprovalRequested, payload)
                .await;
        }
    }

    /// Whether a join request from `principal` should be approved
    #[instrument(skip(self))]
    pub async fn evaluate_join_request(&self, principal: PrincipalId) -> ServiceResult<bool> {
        let member = self.ctx.member_repo().find_by_principal(principal).await?;
        let now = self.ctx.now();
        let approved = member.is_some_and(|m| m.admits(now));
        info!(approved, "Join request evaluated");
        Ok(approved)
    }
}
