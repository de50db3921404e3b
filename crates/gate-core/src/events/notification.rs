//! Notification kinds and their structured payload
//!
//! The core never builds message bodies; it names what happened and passes
//! the data a renderer needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{MembershipId, PrincipalId};

/// Semantic kind of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RenewalWarning,
    GraceWarning,
    Expired,
    AccessGranted,
    AccessDenied,
    Banned,
    SessionTimeout,
    /// Sent to the root admin when a submission awaits a decision
    ApprovalRequested,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RenewalWarning => "renewal_warning",
            Self::GraceWarning => "grace_warning",
            Self::Expired => "expired",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::Banned => "banned",
            Self::SessionTimeout => "session_timeout",
            Self::ApprovalRequested => "approval_requested",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data accompanying a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<MembershipId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    /// Preferred locale of the recipient, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Principal a request concerns, for admin-facing notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<PrincipalId>,
}

impl NotificationPayload {
    pub fn for_membership(membership_id: MembershipId) -> Self {
        Self {
            membership_id: Some(membership_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_remaining(mut self, secs: i64) -> Self {
        self.remaining_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn requested_by(mut self, principal: PrincipalId) -> Self {
        self.requested_by = Some(principal);
        self
    }
}
