//! Notification dispatch
//!
//! Thin wrapper over the [`gate_core::Notifier`] port that fills in the
//! recipient's locale and turns failures into a reportable status.

use gate_core::{NotificationKind, NotificationPayload, PrincipalId};
use serde::Serialize;
use tracing::{debug, warn};

use super::context::ServiceContext;

/// What happened to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Delivery {
    /// Nobody to notify (orphaned record) or nothing to say
    Skipped,
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Deliver `kind` to `principal`. Failures are logged, never raised.
    pub async fn send(
        &self,
        principal: PrincipalId,
        kind: NotificationKind,
        mut payload: NotificationPayload,
    ) -> Delivery {
        if payload.locale.is_none() {
            payload.locale = self
                .ctx
                .principal_repo()
                .get_locale(principal)
                .await
                .unwrap_or_else(|e| {
                    debug!(principal = %principal, error = %e, "Locale lookup failed");
                    None
                });
        }

        match self.ctx.notifier().deliver(principal, kind, &payload).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                warn!(principal = %principal, kind = %kind, error = %e, "Notification not delivered");
                Delivery::Failed(e.to_string())
            }
        }
    }
}
