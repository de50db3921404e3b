//! Expiry/renewal scheduler
//!
//! Each tick runs three phases strictly in order:
//!
//! 1. renewal warnings for grants about to lapse
//! 2. grace notices for grants that lapsed within the grace window
//! 3. hard expiry for grants past the grace window
//!
//! Watermarks are written only after a successful delivery, so a failed
//! warning is retried on the next tick. Hard expiry never depends on
//! delivery. Members within a phase are processed concurrently and a failure
//! for one member never stops the others.
//!
//! Every write is checked against the terms the member was selected with.
//! A member renewed or declined after the phase query is skipped.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use gate_core::traits::MemberLookup;
use gate_core::{DomainError, Member, NotificationKind, NotificationPayload, Transition};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::services::{Delivery, MembershipService, NotificationService, ServiceContext};

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub warned: usize,
    pub grace_notified: usize,
    pub expired: usize,
    /// Members whose terms changed between selection and processing
    pub skipped: usize,
    pub failures: usize,
}

/// Outcome of processing one member in one phase
enum Step {
    Done,
    /// Work done but something along the way failed
    Partial,
    Failed,
    Skipped,
}

impl TickReport {
    fn tally(&mut self, steps: Vec<Step>, phase: fn(&mut Self) -> &mut usize) {
        for step in steps {
            match step {
                Step::Done => *phase(self) += 1,
                Step::Partial => {
                    *phase(self) += 1;
                    self.failures += 1;
                }
                Step::Failed => self.failures += 1,
                Step::Skipped => self.skipped += 1,
            }
        }
    }
}

/// Expiry/renewal scheduler
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    ctx: ServiceContext,
}

impl ExpiryScheduler {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one tick at the context clock's current time
    pub async fn tick(&self) -> TickReport {
        self.tick_at(self.ctx.now()).await
    }

    /// Run one tick as of `now`
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let rules = self.ctx.rules();

        // 1. renewal warnings
        match self
            .ctx
            .member_repo()
            .due_for_warning(now, rules.warn_before())
            .await
        {
            Ok(due) => {
                let steps = join_all(due.iter().map(|m| self.warn(m, now))).await;
                report.tally(steps, |r| &mut r.warned);
            }
            Err(e) => {
                warn!(error = %e, "Warning query failed");
                report.failures += 1;
            }
        }

        // 2. grace notices
        match self
            .ctx
            .member_repo()
            .due_for_grace_notice(now, rules.grace())
            .await
        {
            Ok(due) => {
                let steps = join_all(due.iter().map(|m| self.grace_notice(m, now))).await;
                report.tally(steps, |r| &mut r.grace_notified);
            }
            Err(e) => {
                warn!(error = %e, "Grace query failed");
                report.failures += 1;
            }
        }

        // 3. hard expiry
        let cutoff = now - rules.grace();
        match self.ctx.member_repo().due_for_hard_expiry(cutoff).await {
            Ok(due) => {
                let steps = join_all(due.iter().map(|m| self.expire(m, cutoff))).await;
                report.tally(steps, |r| &mut r.expired);
            }
            Err(e) => {
                warn!(error = %e, "Hard expiry query failed");
                report.failures += 1;
            }
        }

        info!(
            warned = report.warned,
            grace_notified = report.grace_notified,
            expired = report.expired,
            skipped = report.skipped,
            failures = report.failures,
            "Expiry tick finished"
        );
        report
    }

    async fn warn(&self, member: &Member, now: DateTime<Utc>) -> Step {
        let (Some(principal), Some(for_expiry)) = (member.principal_id, member.expires_at) else {
            return Step::Skipped;
        };
        let remaining = member.remaining(now).map_or(0, |d| d.num_seconds());
        let payload = NotificationPayload::for_membership(member.membership_id.clone())
            .with_remaining(remaining)
            .with_expiry(member.expires_at);

        let delivery = NotificationService::new(&self.ctx)
            .send(principal, NotificationKind::RenewalWarning, payload)
            .await;
        self.mark(member, delivery, Transition::MarkWarned { at: now, for_expiry })
            .await
    }

    async fn grace_notice(&self, member: &Member, now: DateTime<Utc>) -> Step {
        let (Some(principal), Some(for_expiry)) = (member.principal_id, member.expires_at) else {
            return Step::Skipped;
        };
        let grace_left = (for_expiry + self.ctx.rules().grace() - now)
            .num_seconds()
            .max(0);
        let payload = NotificationPayload::for_membership(member.membership_id.clone())
            .with_remaining(grace_left)
            .with_expiry(member.expires_at);

        let delivery = NotificationService::new(&self.ctx)
            .send(principal, NotificationKind::GraceWarning, payload)
            .await;
        self.mark(
            member,
            delivery,
            Transition::MarkGraceNotified { at: now, for_expiry },
        )
        .await
    }

    /// Write the watermark once the notification went out, unless the terms
    /// it was sent for have since changed
    async fn mark(&self, member: &Member, delivery: Delivery, watermark: Transition) -> Step {
        if !delivery.is_delivered() {
            return Step::Failed;
        }
        match self
            .ctx
            .member_repo()
            .apply_transition(&MemberLookup::Id(member.id), watermark)
            .await
        {
            Ok(_) => Step::Done,
            Err(DomainError::NoLongerDue(_)) => Step::Skipped,
            Err(e) => {
                warn!(membership_id = %member.membership_id, error = %e, "Watermark not saved");
                Step::Failed
            }
        }
    }

    async fn expire(&self, member: &Member, cutoff: DateTime<Utc>) -> Step {
        match MembershipService::new(&self.ctx).expire(member, cutoff).await {
            Ok(Some(outcome)) => {
                let enforced = outcome.enforcement.map_or(true, |s| s.is_complete());
                if enforced && !matches!(outcome.notification, Delivery::Failed(_)) {
                    Step::Done
                } else {
                    Step::Partial
                }
            }
            Ok(None) => Step::Skipped,
            Err(e) => {
                warn!(membership_id = %member.membership_id, error = %e, "Expiry failed");
                Step::Failed
            }
        }
    }

    /// Tick every `poll_interval` until `shutdown` turns true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.ctx.rules().poll_interval();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poll_interval_secs = period.as_secs(), "Expiry scheduler started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("Expiry scheduler stopped");
    }
}
