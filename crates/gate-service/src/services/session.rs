//! Session activity tracker
//!
//! Remembers when each principal last interacted so idle conversations can
//! be reset. Owned by the service context and injected wherever activity is
//! recorded; nothing here touches the membership store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use gate_core::PrincipalId;

/// Concurrent map of principal -> last activity
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    last_seen: Arc<DashMap<PrincipalId, DateTime<Utc>>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity at `at`
    pub fn touch(&self, principal: PrincipalId, at: DateTime<Utc>) {
        self.last_seen.insert(principal, at);
    }

    /// Forget a principal. Returns whether it was tracked.
    pub fn clear(&self, principal: PrincipalId) -> bool {
        self.last_seen.remove(&principal).is_some()
    }

    pub fn last_activity(&self, principal: PrincipalId) -> Option<DateTime<Utc>> {
        self.last_seen.get(&principal).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    /// Remove and return every principal idle for longer than `timeout`
    pub fn drain_idle(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<PrincipalId> {
        let mut idle = Vec::new();
        self.last_seen.retain(|principal, last| {
            if now - *last > timeout {
                idle.push(*principal);
                false
            } else {
                true
            }
        });
        idle.sort_unstable();
        idle
    }
}
