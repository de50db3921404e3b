//! Idle session sweeper

use std::time::Duration;

use chrono::{DateTime, Utc};
use gate_core::{NotificationKind, NotificationPayload, PrincipalId};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use crate::services::{NotificationService, ServiceContext};

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Resets sessions idle for longer than the configured timeout
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    ctx: ServiceContext,
}

impl SessionSweeper {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn interval(&self) -> Duration {
        self.ctx.rules().session_timeout().min(MAX_SWEEP_INTERVAL)
    }

    /// Drain idle sessions as of `now`, notifying when configured
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Vec<PrincipalId> {
        let timeout = chrono::Duration::seconds(self.ctx.rules().session_timeout_secs as i64);
        let idle = self.ctx.sessions().drain_idle(now, timeout);

        if self.ctx.rules().session_timeout_notify {
            let notifier = NotificationService::new(&self.ctx);
            for &principal in &idle {
                let payload = NotificationPayload::default()
                    .with_remaining(self.ctx.rules().session_timeout_secs as i64);
                notifier
                    .send(principal, NotificationKind::SessionTimeout, payload)
                    .await;
            }
        }

        if !idle.is_empty() {
            info!(count = idle.len(), "Idle sessions reset");
        }
        idle
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.interval();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.sweep_at(self.ctx.now()).await;
                }
            }
        }

        info!("Session sweeper stopped");
    }
}
