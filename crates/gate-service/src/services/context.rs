//! Service context - dependency container for services
//!
//! Holds the repositories, platform ports, clock, rules and session tracker
//! every service needs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gate_common::{AccessConfig, MembershipRules};
use gate_core::traits::{
    AdminRepository, EndpointClient, EndpointLinkRepository, MemberRepository, Notifier,
    PrincipalRepository,
};
use gate_core::{Clock, EndpointId, GrantDuration, MembershipIdPolicy, PrincipalId, SystemClock};
use gate_db::Repositories;

use super::error::{ServiceError, ServiceResult};
use super::session::SessionTracker;

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    repos: Repositories,

    // Platform ports
    endpoint_client: Arc<dyn EndpointClient>,
    notifier: Arc<dyn Notifier>,

    clock: Arc<dyn Clock>,
    sessions: SessionTracker,

    // Rules and access settings
    rules: Arc<MembershipRules>,
    id_policy: Arc<MembershipIdPolicy>,
    grant_durations: Arc<[GrantDuration]>,
    access: Arc<AccessConfig>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.repos.members.as_ref()
    }

    pub fn principal_repo(&self) -> &dyn PrincipalRepository {
        self.repos.principals.as_ref()
    }

    pub fn admin_repo(&self) -> &dyn AdminRepository {
        self.repos.admins.as_ref()
    }

    pub fn link_repo(&self) -> &dyn EndpointLinkRepository {
        self.repos.links.as_ref()
    }

    // === Platform ===

    pub fn endpoint_client(&self) -> &dyn EndpointClient {
        self.endpoint_client.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    // === Time and sessions ===

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time from the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    // === Rules ===

    pub fn rules(&self) -> &MembershipRules {
        &self.rules
    }

    pub fn id_policy(&self) -> &MembershipIdPolicy {
        &self.id_policy
    }

    /// Durations offered to administrators
    pub fn grant_durations(&self) -> &[GrantDuration] {
        &self.grant_durations
    }

    /// Configured access endpoints, in configuration order
    pub fn endpoints(&self) -> &[EndpointId] {
        &self.access.endpoints
    }

    pub fn root_admin(&self) -> Option<PrincipalId> {
        self.access.root_admin
    }

    /// Label for a generated join link, if a prefix is configured
    pub fn join_link_label(&self, endpoint: EndpointId) -> Option<String> {
        self.access
            .join_link_label_prefix
            .as_ref()
            .map(|prefix| format!("{prefix}{endpoint}"))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("endpoints", &self.access.endpoints)
            .field("root_admin", &self.access.root_admin)
            .field("rules", &self.rules)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    repos: Option<Repositories>,
    endpoint_client: Option<Arc<dyn EndpointClient>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    sessions: Option<SessionTracker>,
    rules: Option<MembershipRules>,
    access: Option<AccessConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(mut self, repos: Repositories) -> Self {
        self.repos = Some(repos);
        self
    }

    pub fn endpoint_client(mut self, client: Arc<dyn EndpointClient>) -> Self {
        self.endpoint_client = Some(client);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Defaults to the system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sessions(mut self, sessions: SessionTracker) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn rules(mut self, rules: MembershipRules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn access(mut self, access: AccessConfig) -> Self {
        self.access = Some(access);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a required dependency is missing
    /// or the membership rules do not parse
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let rules = self.rules.unwrap_or_default();
        let id_policy = rules.id_policy()?;
        let grant_durations = rules.grant_durations()?;

        Ok(ServiceContext {
            repos: self
                .repos
                .ok_or_else(|| ServiceError::validation("repositories are required"))?,
            endpoint_client: self
                .endpoint_client
                .ok_or_else(|| ServiceError::validation("endpoint_client is required"))?,
            notifier: self
                .notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            sessions: self.sessions.unwrap_or_default(),
            rules: Arc::new(rules),
            id_policy: Arc::new(id_policy),
            grant_durations: grant_durations.into(),
            access: Arc::new(self.access.unwrap_or_default()),
        })
    }
}
