//! Member entity - the binding of a membership id to a principal
//!
//! All confirmation, ban and watermark changes go through [`Member::apply`],
//! which keeps the record invariants:
//!
//! - `is_confirmed == false` implies `expires_at == None`
//! - any change to confirmation or expiry clears both watermarks
//! - a banned member holds no confirmation or expiry
//!
//! Scheduler transitions carry the terms they were computed from and fail
//! with [`DomainError::NoLongerDue`] when the stored record has moved on.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::DomainError;
use crate::value_objects::{GrantDuration, MembershipId, PrincipalId};

/// Membership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: i64,
    pub membership_id: MembershipId,
    pub principal_id: Option<PrincipalId>,
    pub is_confirmed: bool,
    pub is_banned: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub warn_sent_at: Option<DateTime<Utc>>,
    pub grace_notified_at: Option<DateTime<Utc>>,
    /// Joined from the principal row, when bound
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

/// A state change applied to a member record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Set confirmation and expiry together. Expiry is dropped when not confirmed.
    SetConfirmation {
        confirmed: bool,
        expires_at: Option<DateTime<Utc>>,
    },
    /// Confirm for a duration, extending from the later of `now` and the
    /// current expiry when the member is already confirmed
    Grant {
        duration: GrantDuration,
        now: DateTime<Utc>,
    },
    Decline,
    /// Decline a grant that lapsed at or before `cutoff`
    Expire { cutoff: DateTime<Utc> },
    SetBan { banned: bool },
    /// Renewal warning sent for the grant ending at `for_expiry`
    MarkWarned {
        at: DateTime<Utc>,
        for_expiry: DateTime<Utc>,
    },
    /// Grace notice sent for the grant ending at `for_expiry`
    MarkGraceNotified {
        at: DateTime<Utc>,
        for_expiry: DateTime<Utc>,
    },
}

/// Status derived from a record at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Banned,
    /// Confirmed with no expiry
    Lifetime,
    Active { remaining: Duration },
    Expired,
    Unconfirmed,
}

impl MemberStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Banned => "banned",
            Self::Lifetime => "lifetime",
            Self::Active { .. } => "active",
            Self::Expired => "expired",
            Self::Unconfirmed => "none",
        }
    }

    pub fn remaining_seconds(&self) -> Option<i64> {
        match self {
            Self::Active { remaining } => Some(remaining.num_seconds()),
            Self::Expired => Some(0),
            _ => None,
        }
    }
}

impl Member {
    /// Fresh record: unbanned, no expiry, no watermarks
    pub fn new(
        id: i64,
        membership_id: MembershipId,
        principal_id: Option<PrincipalId>,
        is_confirmed: bool,
    ) -> Self {
        Self {
            id,
            membership_id,
            principal_id,
            is_confirmed,
            is_banned: false,
            expires_at: None,
            warn_sent_at: None,
            grace_notified_at: None,
            handle: None,
            display_name: None,
        }
    }

    /// Apply a transition in place.
    ///
    /// Confirming a banned member is refused with [`DomainError::MemberBanned`];
    /// the record is left untouched in that case.
    pub fn apply(&mut self, transition: &Transition) -> Result<(), DomainError> {
        match *transition {
            Transition::SetConfirmation {
                confirmed,
                expires_at,
            } => {
                if confirmed {
                    self.ensure_not_banned()?;
                }
                self.set_confirmation(confirmed, expires_at);
            }
            Transition::Grant { duration, now } => {
                self.ensure_not_banned()?;
                let expires_at = self.renewed_expiry(duration, now)?;
                self.set_confirmation(true, expires_at);
            }
            Transition::Decline => self.set_confirmation(false, None),
            Transition::Expire { cutoff } => {
                if !self.is_due_for_expiry(cutoff) {
                    return Err(self.no_longer_due());
                }
                self.set_confirmation(false, None);
            }
            Transition::SetBan { banned: true } => {
                self.is_banned = true;
                self.set_confirmation(false, None);
            }
            Transition::SetBan { banned: false } => self.is_banned = false,
            Transition::MarkWarned { at, for_expiry } => {
                self.ensure_terms(for_expiry)?;
                self.warn_sent_at = Some(at);
            }
            Transition::MarkGraceNotified { at, for_expiry } => {
                self.ensure_terms(for_expiry)?;
                self.grace_notified_at = Some(at);
            }
        }
        Ok(())
    }

    /// Expiry a grant of `duration` at `now` would produce.
    ///
    /// Fails with [`DomainError::InvalidDuration`] when the result is not a
    /// representable timestamp.
    pub fn renewed_expiry(
        &self,
        duration: GrantDuration,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let Some(extra) = duration.as_duration()? else {
            return Ok(None);
        };
        let base = match self.expires_at {
            Some(current) if self.is_confirmed => current.max(now),
            _ => now,
        };
        base.checked_add_signed(extra)
            .map(Some)
            .ok_or(DomainError::InvalidDuration(duration.as_secs()))
    }

    /// Confirmed with a grant that ended at or before `cutoff`
    pub fn is_due_for_expiry(&self, cutoff: DateTime<Utc>) -> bool {
        self.is_confirmed && self.expires_at.is_some_and(|exp| exp <= cutoff)
    }

    pub fn status(&self, now: DateTime<Utc>) -> MemberStatus {
        if self.is_banned {
            return MemberStatus::Banned;
        }
        if !self.is_confirmed {
            return MemberStatus::Unconfirmed;
        }
        match self.expires_at {
            None => MemberStatus::Lifetime,
            Some(exp) if exp > now => MemberStatus::Active {
                remaining: exp - now,
            },
            Some(_) => MemberStatus::Expired,
        }
    }

    /// Whether a join request from this member should be approved
    pub fn admits(&self, now: DateTime<Utc>) -> bool {
        self.is_confirmed && !self.is_banned && self.expires_at.map_or(true, |exp| exp > now)
    }

    /// Time left until expiry, if confirmed with a future expiry
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.status(now) {
            MemberStatus::Active { remaining } => Some(remaining),
            _ => None,
        }
    }

    #[inline]
    pub fn is_orphaned(&self) -> bool {
        self.principal_id.is_none()
    }

    fn set_confirmation(&mut self, confirmed: bool, expires_at: Option<DateTime<Utc>>) {
        self.is_confirmed = confirmed;
        self.expires_at = if confirmed { expires_at } else { None };
        self.warn_sent_at = None;
        self.grace_notified_at = None;
    }

    fn ensure_terms(&self, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_confirmed && self.expires_at == Some(expires_at) {
            Ok(())
        } else {
            Err(self.no_longer_due())
        }
    }

    fn no_longer_due(&self) -> DomainError {
        DomainError::NoLongerDue(self.membership_id.to_string())
    }

    fn ensure_not_banned(&self) -> Result<(), DomainError> {
        if self.is_banned {
            return Err(DomainError::MemberBanned(self.membership_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn member() -> Member {
        Member::new(1, MembershipId::new("M-1"), Some(PrincipalId::new(100)), false)
    }

    #[test]
    fn test_renewal_extends_from_prior_expiry() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(now + Duration::seconds(10)),
        })
        .unwrap();

        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(20),
            now: now + Duration::seconds(5),
        })
        .unwrap();

        assert_eq!(m.expires_at, Some(now + Duration::seconds(30)));
    }

    #[test]
    fn test_renewal_after_expiry_extends_from_now() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(now - Duration::seconds(100)),
        })
        .unwrap();

        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(20),
            now,
        })
        .unwrap();

        assert_eq!(m.expires_at, Some(now + Duration::seconds(20)));
    }

    #[test]
    fn test_unlimited_grant_is_lifetime() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::Grant {
            duration: GrantDuration::Unlimited,
            now,
        })
        .unwrap();

        assert!(m.is_confirmed);
        assert_eq!(m.expires_at, None);
        assert_eq!(m.status(now), MemberStatus::Lifetime);
        assert_eq!(m.status(now).label(), "lifetime");
    }

    #[test]
    fn test_confirmation_change_clears_watermarks() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(60),
            now,
        })
        .unwrap();
        let exp = now + Duration::seconds(60);
        m.apply(&Transition::MarkWarned { at: now, for_expiry: exp })
            .unwrap();
        m.apply(&Transition::MarkGraceNotified { at: now, for_expiry: exp })
            .unwrap();

        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(60),
            now,
        })
        .unwrap();

        assert_eq!(m.warn_sent_at, None);
        assert_eq!(m.grace_notified_at, None);
    }

    #[test]
    fn test_ban_clears_confirmation() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(60),
            now,
        })
        .unwrap();

        m.apply(&Transition::SetBan { banned: true }).unwrap();

        assert!(m.is_banned);
        assert!(!m.is_confirmed);
        assert_eq!(m.expires_at, None);
        assert_eq!(m.status(now).label(), "banned");
    }

    #[test]
    fn test_unban_only_clears_flag() {
        let mut m = member();
        m.apply(&Transition::SetBan { banned: true }).unwrap();
        m.apply(&Transition::SetBan { banned: false }).unwrap();

        assert!(!m.is_banned);
        assert!(!m.is_confirmed);
    }

    #[test]
    fn test_banned_member_cannot_be_confirmed() {
        let mut m = member();
        m.apply(&Transition::SetBan { banned: true }).unwrap();

        let err = m
            .apply(&Transition::Grant {
                duration: GrantDuration::Unlimited,
                now: t0(),
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::MemberBanned(_)));
        assert!(!m.is_confirmed);
    }

    #[test]
    fn test_decline_keeps_ban() {
        let mut m = member();
        m.apply(&Transition::SetBan { banned: true }).unwrap();
        m.apply(&Transition::Decline).unwrap();
        assert!(m.is_banned);
    }

    #[test]
    fn test_status_derivation() {
        let now = t0();
        let mut m = member();
        assert_eq!(m.status(now).label(), "none");
        assert_eq!(m.status(now).remaining_seconds(), None);

        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(now + Duration::seconds(90)),
        })
        .unwrap();
        assert_eq!(m.status(now).label(), "active");
        assert_eq!(m.status(now).remaining_seconds(), Some(90));

        assert_eq!(m.status(now + Duration::seconds(90)), MemberStatus::Expired);
        assert_eq!(
            m.status(now + Duration::seconds(90)).remaining_seconds(),
            Some(0)
        );
    }

    #[test]
    fn test_admits() {
        let now = t0();
        let mut m = member();
        assert!(!m.admits(now));

        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(now + Duration::seconds(1)),
        })
        .unwrap();
        assert!(m.admits(now));
        assert!(!m.admits(now + Duration::seconds(1)));

        m.apply(&Transition::SetBan { banned: true }).unwrap();
        assert!(!m.admits(now));
    }

    #[test]
    fn test_oversized_grant_is_refused() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(60),
            now,
        })
        .unwrap();
        let before = m.clone();

        let err = m
            .apply(&Transition::Grant {
                duration: GrantDuration::Seconds(i64::MAX),
                now,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDuration(i64::MAX)));
        assert_eq!(m, before);

        let max = GrantDuration::from_secs(GrantDuration::MAX_SECS).unwrap();
        let at_edge = DateTime::<Utc>::MAX_UTC - Duration::seconds(10);
        assert!(matches!(
            member().renewed_expiry(max, at_edge),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_expire_requires_lapsed_grant() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(now - Duration::seconds(10)),
        })
        .unwrap();
        let stale = m.clone();

        // renewed after the scheduler read the record
        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(3600),
            now,
        })
        .unwrap();
        let renewed = m.clone();
        let err = m.apply(&Transition::Expire { cutoff: now }).unwrap_err();
        assert!(matches!(err, DomainError::NoLongerDue(_)));
        assert_eq!(m, renewed);

        let mut lapsed = stale;
        lapsed.apply(&Transition::Expire { cutoff: now }).unwrap();
        assert!(!lapsed.is_confirmed);
        assert_eq!(lapsed.expires_at, None);

        let mut lifetime = member();
        lifetime
            .apply(&Transition::Grant {
                duration: GrantDuration::Unlimited,
                now,
            })
            .unwrap();
        assert!(lifetime.apply(&Transition::Expire { cutoff: now }).is_err());
    }

    #[test]
    fn test_watermark_needs_matching_terms() {
        let now = t0();
        let exp = now + Duration::seconds(60);
        let mut m = member();
        m.apply(&Transition::SetConfirmation {
            confirmed: true,
            expires_at: Some(exp),
        })
        .unwrap();

        m.apply(&Transition::Grant {
            duration: GrantDuration::Seconds(60),
            now,
        })
        .unwrap();
        let err = m
            .apply(&Transition::MarkWarned { at: now, for_expiry: exp })
            .unwrap_err();
        assert!(matches!(err, DomainError::NoLongerDue(_)));
        assert_eq!(m.warn_sent_at, None);

        let current = m.expires_at.unwrap();
        m.apply(&Transition::MarkGraceNotified { at: now, for_expiry: current })
            .unwrap();
        assert_eq!(m.grace_notified_at, Some(now));
    }

    #[test]
    fn test_unconfirmed_set_confirmation_drops_expiry() {
        let now = t0();
        let mut m = member();
        m.apply(&Transition::SetConfirmation {
            confirmed: false,
            expires_at: Some(now),
        })
        .unwrap();
        assert_eq!(m.expires_at, None);
    }

    fn transition_strategy() -> impl Strategy<Value = Transition> {
        let at = (0i64..1_000_000).prop_map(|s| t0() + Duration::seconds(s));
        let duration = prop_oneof![
            Just(GrantDuration::Unlimited),
            (1i64..1_000_000).prop_map(GrantDuration::Seconds),
            Just(GrantDuration::Seconds(i64::MAX)),
        ];
        prop_oneof![
            (any::<bool>(), proptest::option::of(at.clone())).prop_map(
                |(confirmed, expires_at)| Transition::SetConfirmation {
                    confirmed,
                    expires_at
                }
            ),
            (duration, at.clone()).prop_map(|(duration, now)| Transition::Grant { duration, now }),
            Just(Transition::Decline),
            any::<bool>().prop_map(|banned| Transition::SetBan { banned }),
            at.clone().prop_map(|cutoff| Transition::Expire { cutoff }),
            (at.clone(), at.clone())
                .prop_map(|(at, for_expiry)| Transition::MarkWarned { at, for_expiry }),
            (at.clone(), at).prop_map(|(at, for_expiry)| Transition::MarkGraceNotified {
                at,
                for_expiry
            }),
        ]
    }

    proptest! {
        #[test]
        fn test_invariants_hold_after_any_sequence(
            transitions in proptest::collection::vec(transition_strategy(), 0..40)
        ) {
            let mut m = member();
            for t in &transitions {
                let before = m.clone();
                match m.apply(t) {
                    Ok(()) => {}
                    Err(_) => prop_assert_eq!(&m, &before),
                }
                if !m.is_confirmed {
                    prop_assert!(m.expires_at.is_none());
                }
                if m.is_banned {
                    prop_assert!(!m.is_confirmed);
                }
                let terms_changed = m.is_confirmed != before.is_confirmed
                    || m.expires_at != before.expires_at;
                if terms_changed {
                    prop_assert!(m.warn_sent_at.is_none());
                    prop_assert!(m.grace_notified_at.is_none());
                }
            }
        }
    }
}
