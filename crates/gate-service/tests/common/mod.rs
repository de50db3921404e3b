//! Shared harness: in-memory SQLite store, scripted platform fakes and a
//! manual clock.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use gate_common::{AccessConfig, MembershipRules};
use gate_core::{
    DeliveryError, EndpointClient, EndpointError, EndpointId, GrantDuration, ManualClock,
    MemberLookup, MemberRepository, MembershipId, NotificationKind, NotificationPayload,
    Notifier, PrincipalId, PrincipalProfile, Transition,
};
use gate_db::{Database, DatabaseConfig, Repositories};
use gate_service::ServiceContext;

pub const ROOT: PrincipalId = PrincipalId::new(1);
pub const ENDPOINTS: [i64; 3] = [1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Ban(EndpointId, PrincipalId),
    Unban(EndpointId, PrincipalId),
    CreateLink(EndpointId),
}

/// Endpoint client that records calls and fails for chosen endpoints
#[derive(Default)]
pub struct FakeEndpoints {
    pub calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<EndpointId>>,
    departed: Mutex<HashSet<(EndpointId, PrincipalId)>>,
}

impl FakeEndpoints {
    pub fn fail(&self, endpoint: i64) {
        self.failing.lock().insert(EndpointId::new(endpoint));
    }

    /// Report `principal` as outside `endpoint`
    pub fn depart(&self, endpoint: i64, principal: PrincipalId) {
        self.departed.lock().insert((EndpointId::new(endpoint), principal));
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn check(&self, endpoint: EndpointId) -> Result<(), EndpointError> {
        if self.failing.lock().contains(&endpoint) {
            return Err(EndpointError::new(format!("endpoint {endpoint} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl EndpointClient for FakeEndpoints {
    async fn ban(&self, endpoint: EndpointId, principal: PrincipalId) -> Result<(), EndpointError> {
        self.calls.lock().push(Call::Ban(endpoint, principal));
        self.check(endpoint)
    }

    async fn unban(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<(), EndpointError> {
        self.calls.lock().push(Call::Unban(endpoint, principal));
        self.check(endpoint)
    }

    async fn create_join_link(
        &self,
        endpoint: EndpointId,
        label: Option<&str>,
    ) -> Result<String, EndpointError> {
        self.calls.lock().push(Call::CreateLink(endpoint));
        self.check(endpoint)?;
        Ok(format!(
            "https://t.example/+join{endpoint}{}",
            label.map(|l| format!("?{l}")).unwrap_or_default()
        ))
    }

    async fn is_present(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<bool, EndpointError> {
        self.check(endpoint)?;
        Ok(!self.departed.lock().contains(&(endpoint, principal)))
    }
}

/// Grant applied straight to the store while a notification is in flight,
/// standing in for an admin confirming at that moment
pub struct Renewal {
    pub on: NotificationKind,
    pub members: Arc<dyn MemberRepository>,
    pub membership_id: MembershipId,
    pub duration: GrantDuration,
    pub now: DateTime<Utc>,
}

/// Notifier that records deliveries and refuses chosen principals
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(PrincipalId, NotificationKind, NotificationPayload)>>,
    blocked: Mutex<HashSet<PrincipalId>>,
    renewal: Mutex<Option<Renewal>>,
}

impl FakeNotifier {
    pub fn renew_during(&self, renewal: Renewal) {
        *self.renewal.lock() = Some(renewal);
    }

    pub fn block(&self, principal: PrincipalId) {
        self.blocked.lock().insert(principal);
    }

    pub fn unblock(&self, principal: PrincipalId) {
        self.blocked.lock().remove(&principal);
    }

    pub fn kinds_for(&self, principal: PrincipalId) -> Vec<NotificationKind> {
        self.sent
            .lock()
            .iter()
            .filter(|(p, _, _)| *p == principal)
            .map(|(_, k, _)| *k)
            .collect()
    }

    pub fn last_for(&self, principal: PrincipalId) -> Option<(NotificationKind, NotificationPayload)> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|(p, _, _)| *p == principal)
            .map(|(_, k, payload)| (*k, payload.clone()))
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.sent.lock().iter().filter(|(_, k, _)| *k == kind).count()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn deliver(
        &self,
        principal: PrincipalId,
        kind: NotificationKind,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        if self.blocked.lock().contains(&principal) {
            return Err(DeliveryError::Unreachable(format!("{principal} blocked the bot")));
        }
        self.sent.lock().push((principal, kind, payload.clone()));

        let renewal = {
            let mut slot = self.renewal.lock();
            if slot.as_ref().is_some_and(|r| r.on == kind) {
                slot.take()
            } else {
                None
            }
        };
        if let Some(r) = renewal {
            r.members
                .apply_transition(
                    &MemberLookup::Membership(r.membership_id),
                    Transition::Grant {
                        duration: r.duration,
                        now: r.now,
                    },
                )
                .await
                .expect("renewal applies");
        }
        Ok(())
    }
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub members: Arc<dyn MemberRepository>,
    pub endpoints: Arc<FakeEndpoints>,
    pub notifier: Arc<FakeNotifier>,
    pub clock: Arc<ManualClock>,
}

/// Whole-second start time (SQLite stores unix seconds)
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub async fn harness() -> Harness {
    harness_with(MembershipRules::default()).await
}

pub async fn harness_with(rules: MembershipRules) -> Harness {
    let db = Database::connect(&DatabaseConfig::sqlite_memory())
        .await
        .expect("sqlite connects");
    db.apply_schema().await.expect("schema applies");

    let endpoints = Arc::new(FakeEndpoints::default());
    let notifier = Arc::new(FakeNotifier::default());
    let clock = Arc::new(ManualClock::new(start_time()));

    let repos = Repositories::new(&db);
    let members = Arc::clone(&repos.members);
    let ctx = ServiceContext::builder()
        .repositories(repos)
        .endpoint_client(endpoints.clone())
        .notifier(notifier.clone())
        .clock(clock.clone())
        .rules(rules)
        .access(AccessConfig {
            endpoints: ENDPOINTS.iter().copied().map(EndpointId::new).collect(),
            root_admin: Some(ROOT),
            join_link_label_prefix: Some("gate-".to_string()),
        })
        .build()
        .expect("context builds");

    Harness {
        ctx,
        members,
        endpoints,
        notifier,
        clock,
    }
}

pub fn profile(id: i64, handle: &str) -> PrincipalProfile {
    PrincipalProfile::new(PrincipalId::new(id)).with_handle(handle)
}
