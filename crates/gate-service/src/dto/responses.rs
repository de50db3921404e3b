//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use gate_core::{
    Admin, EndpointId, ExportRow, ExportScope, GrantDuration, Member, MembershipId, PrincipalId,
};
use serde::Serialize;

use crate::services::{
    Delivery, EnforcementAction, EnforcementSummary, SubmissionOutcome, SubmissionResult,
    TransitionOutcome,
};

// ============================================================================
// Member Responses
// ============================================================================

/// Member record with its status derived at response time
#[derive(Debug, Clone, Serialize)]
pub struct MemberCard {
    pub membership_id: MembershipId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<PrincipalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_confirmed: bool,
    pub is_banned: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_notified_at: Option<DateTime<Utc>>,
    /// Inside at least one endpoint; absent for unbound records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_endpoints: Option<bool>,
}

impl MemberCard {
    pub fn from_member(member: Member, now: DateTime<Utc>) -> Self {
        let status = member.status(now);
        Self {
            membership_id: member.membership_id,
            principal_id: member.principal_id,
            handle: member.handle,
            display_name: member.display_name,
            is_confirmed: member.is_confirmed,
            is_banned: member.is_banned,
            expires_at: member.expires_at,
            status: status.label(),
            remaining_secs: status.remaining_seconds(),
            warn_sent_at: member.warn_sent_at,
            grace_notified_at: member.grace_notified_at,
            in_endpoints: None,
        }
    }

    pub fn with_presence(mut self, in_endpoints: bool) -> Self {
        self.in_endpoints = Some(in_endpoints);
        self
    }
}

/// One endpoint that did not accept an enforcement call
#[derive(Debug, Clone, Serialize)]
pub struct EndpointFailure {
    pub endpoint_id: EndpointId,
    pub error: String,
}

/// Per-endpoint enforcement report
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementResponse {
    pub action: EnforcementAction,
    pub ok: usize,
    pub total: usize,
    pub failures: Vec<EndpointFailure>,
}

impl From<EnforcementSummary> for EnforcementResponse {
    fn from(summary: EnforcementSummary) -> Self {
        Self {
            action: summary.action,
            ok: summary.ok_count(),
            total: summary.total(),
            failures: summary
                .failed
                .into_iter()
                .map(|(endpoint_id, error)| EndpointFailure { endpoint_id, error })
                .collect(),
        }
    }
}

/// Result of an administrative transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub member: MemberCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforcement: Option<EnforcementResponse>,
    pub notification: Delivery,
}

impl TransitionResponse {
    pub fn from_outcome(outcome: TransitionOutcome, now: DateTime<Utc>) -> Self {
        Self {
            member: MemberCard::from_member(outcome.member, now),
            enforcement: outcome.enforcement.map(EnforcementResponse::from),
            notification: outcome.notification,
        }
    }
}

/// Result of a credential submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    pub decision: &'static str,
    pub member: MemberCard,
}

impl SubmissionResponse {
    pub fn from_result(result: SubmissionResult, now: DateTime<Utc>) -> Self {
        Self {
            outcome: result.outcome,
            decision: result.decision.as_str(),
            member: MemberCard::from_member(result.member, now),
        }
    }
}

/// Join-request verdict
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JoinDecisionResponse {
    pub principal_id: PrincipalId,
    pub approved: bool,
}

/// Member export
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub scope: ExportScope,
    pub count: usize,
    pub members: Vec<ExportRow>,
}

impl ExportResponse {
    pub fn new(scope: ExportScope, members: Vec<ExportRow>) -> Self {
        Self {
            scope,
            count: members.len(),
            members,
        }
    }
}

// ============================================================================
// Admin & Config Responses
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdminResponse {
    pub principal_id: PrincipalId,
    pub is_top_level: bool,
    pub is_root: bool,
}

impl AdminResponse {
    pub fn from_admin(admin: Admin, root: Option<PrincipalId>) -> Self {
        Self {
            principal_id: admin.principal_id,
            is_top_level: admin.is_top_level,
            is_root: root == Some(admin.principal_id),
        }
    }
}

/// Preferred locale of a principal
#[derive(Debug, Clone, Serialize)]
pub struct LocaleResponse {
    pub principal_id: PrincipalId,
    pub locale: Option<String>,
}

/// One configured approve duration
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GrantDurationResponse {
    /// `0` means unlimited
    pub secs: i64,
    pub unlimited: bool,
}

impl From<GrantDuration> for GrantDurationResponse {
    fn from(duration: GrantDuration) -> Self {
        Self {
            secs: duration.as_secs(),
            unlimited: duration.is_unlimited(),
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
