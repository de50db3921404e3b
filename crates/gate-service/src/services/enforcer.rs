//! Access enforcer
//!
//! Applies ban, unban and kick to a principal across every configured access
//! endpoint. Endpoints are processed concurrently and independently; one
//! failure never stops the others.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use futures::future::join_all;
use gate_core::{EndpointError, EndpointId, PrincipalId};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;

/// Operation applied at every endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementAction {
    Ban,
    Unban,
    /// Ban immediately followed by unban: removes without a lasting ban
    Kick,
}

impl EnforcementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Kick => "kick",
        }
    }
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-endpoint result of one enforcement operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementSummary {
    pub action: EnforcementAction,
    pub succeeded: BTreeSet<EndpointId>,
    /// Endpoint -> error description
    pub failed: BTreeMap<EndpointId, String>,
}

impl EnforcementSummary {
    pub fn new(action: EnforcementAction) -> Self {
        Self {
            action,
            succeeded: BTreeSet::new(),
            failed: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, endpoint: EndpointId, result: Result<(), EndpointError>) {
        match result {
            Ok(()) => {
                self.succeeded.insert(endpoint);
            }
            Err(e) => {
                self.failed.insert(endpoint, e.to_string());
            }
        }
    }

    pub fn ok_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Access enforcer
pub struct AccessEnforcer<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessEnforcer<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn ban(&self, principal: PrincipalId) -> EnforcementSummary {
        self.apply(EnforcementAction::Ban, principal).await
    }

    pub async fn unban(&self, principal: PrincipalId) -> EnforcementSummary {
        self.apply(EnforcementAction::Unban, principal).await
    }

    pub async fn kick(&self, principal: PrincipalId) -> EnforcementSummary {
        self.apply(EnforcementAction::Kick, principal).await
    }

    /// Run `action` at every configured endpoint and collect the outcomes
    #[instrument(skip(self), fields(endpoints = self.ctx.endpoints().len()))]
    pub async fn apply(&self, action: EnforcementAction, principal: PrincipalId) -> EnforcementSummary {
        let results = join_all(self.ctx.endpoints().iter().map(|&endpoint| async move {
            (endpoint, self.run(action, endpoint, principal).await)
        }))
        .await;

        let mut summary = EnforcementSummary::new(action);
        for (endpoint, result) in results {
            if let Err(e) = &result {
                warn!(endpoint = %endpoint, error = %e, "Enforcement failed at endpoint");
            }
            summary.record(endpoint, result);
        }

        info!(
            ok = summary.ok_count(),
            total = summary.total(),
            "Enforcement finished"
        );
        summary
    }

    async fn run(
        &self,
        action: EnforcementAction,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<(), EndpointError> {
        let client = self.ctx.endpoint_client();
        match action {
            EnforcementAction::Ban => client.ban(endpoint, principal).await,
            EnforcementAction::Unban => client.unban(endpoint, principal).await,
            EnforcementAction::Kick => {
                client.ban(endpoint, principal).await?;
                client.unban(endpoint, principal).await
            }
        }
    }
}
