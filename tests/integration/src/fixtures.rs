//! Test fixtures and platform fakes
//!
//! Provides request bodies and in-process stand-ins for the bot API and the
//! notification webhook.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use gate_common::{AppConfig, MembershipRules};
use gate_core::{
    DeliveryError, EndpointClient, EndpointError, EndpointId, NotificationKind,
    NotificationPayload, Notifier, PrincipalId,
};
use parking_lot::Mutex;
use serde::Serialize;

/// Shared secret the test server expects
pub const API_TOKEN: &str = "test-admin-token";
/// Configured root admin
pub const ROOT_ADMIN: i64 = 1;
/// Configured endpoints
pub const ENDPOINTS: [i64; 2] = [-1001, -1002];

/// Counter for unique principals and membership ids
static COUNTER: AtomicI64 = AtomicI64::new(1000);

/// Get a unique suffix for test data
pub fn unique_suffix() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Configuration for an in-memory test server
pub fn test_config() -> anyhow::Result<AppConfig> {
    let endpoints = ENDPOINTS.map(|e| e.to_string()).join(",");
    let vars: HashMap<&str, String> = HashMap::from([
        ("DB_BACKEND", "sqlite".to_string()),
        ("DATABASE_URL", "sqlite::memory:".to_string()),
        ("ADMIN_API_TOKEN", API_TOKEN.to_string()),
        ("PLATFORM_BOT_TOKEN", "unused".to_string()),
        ("NOTIFY_WEBHOOK_URL", "http://127.0.0.1:9/unused".to_string()),
        ("ACCESS_ENDPOINTS", endpoints),
        ("ROOT_ADMIN_ID", ROOT_ADMIN.to_string()),
    ]);

    AppConfig::from_lookup(|key| vars.get(key).cloned(), MembershipRules::default())
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Credential submission body
#[derive(Debug, Serialize)]
pub struct SubmissionBody {
    pub principal_id: i64,
    pub handle: Option<String>,
    pub membership_id: String,
}

impl SubmissionBody {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            principal_id: suffix,
            handle: Some(format!("user{suffix}")),
            membership_id: format!("M-{suffix}"),
        }
    }
}

/// Endpoint client that records bans and can refuse chosen endpoints
#[derive(Default)]
pub struct RecordingEndpoints {
    bans: Mutex<Vec<(EndpointId, PrincipalId)>>,
    unbans: Mutex<Vec<(EndpointId, PrincipalId)>>,
    failing: Mutex<HashSet<EndpointId>>,
}

impl RecordingEndpoints {
    pub fn fail(&self, endpoint: i64) {
        self.failing.lock().insert(EndpointId::new(endpoint));
    }

    pub fn bans(&self) -> Vec<(EndpointId, PrincipalId)> {
        self.bans.lock().clone()
    }

    pub fn unbans(&self) -> Vec<(EndpointId, PrincipalId)> {
        self.unbans.lock().clone()
    }

    fn check(&self, endpoint: EndpointId) -> Result<(), EndpointError> {
        if self.failing.lock().contains(&endpoint) {
            return Err(EndpointError::new("Bad Request: chat not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl EndpointClient for RecordingEndpoints {
    async fn ban(&self, endpoint: EndpointId, principal: PrincipalId) -> Result<(), EndpointError> {
        self.bans.lock().push((endpoint, principal));
        self.check(endpoint)
    }

    async fn unban(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<(), EndpointError> {
        self.unbans.lock().push((endpoint, principal));
        self.check(endpoint)
    }

    async fn create_join_link(
        &self,
        endpoint: EndpointId,
        _label: Option<&str>,
    ) -> Result<String, EndpointError> {
        self.check(endpoint)?;
        Ok(format!("https://t.example/+join{endpoint}"))
    }

    async fn is_present(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<bool, EndpointError> {
        self.check(endpoint)?;
        // Bans and kicks both remove; nobody rejoins here
        let banned = self.bans.lock().contains(&(endpoint, principal));
        Ok(!banned)
    }
}

/// Notifier that records every delivery
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(PrincipalId, NotificationKind)>>,
}

impl RecordingNotifier {
    pub fn kinds_for(&self, principal: i64) -> Vec<NotificationKind> {
        let principal = PrincipalId::new(principal);
        self.sent
            .lock()
            .iter()
            .filter(|(p, _)| *p == principal)
            .map(|(_, kind)| *kind)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(
        &self,
        principal: PrincipalId,
        kind: NotificationKind,
        _payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().push((principal, kind));
        Ok(())
    }
}
