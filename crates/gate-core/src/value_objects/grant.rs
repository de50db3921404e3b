//! Grant duration chosen by an administrator on confirmation

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// How long a confirmation lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum GrantDuration {
    /// No expiry
    Unlimited,
    /// Fixed number of seconds, `1..=MAX_SECS` when built through `from_secs`
    Seconds(i64),
}

impl GrantDuration {
    /// Wire sentinel for unlimited grants
    pub const UNLIMITED_SECS: i64 = 0;

    /// Longest fixed grant accepted (100 years)
    pub const MAX_SECS: i64 = 100 * 365 * 24 * 60 * 60;

    /// Interpret a seconds value, `0` meaning unlimited
    pub fn from_secs(secs: i64) -> Result<Self, DomainError> {
        match secs {
            Self::UNLIMITED_SECS => Ok(Self::Unlimited),
            s if s > 0 && s <= Self::MAX_SECS => Ok(Self::Seconds(s)),
            s => Err(DomainError::InvalidDuration(s)),
        }
    }

    pub fn as_secs(&self) -> i64 {
        match self {
            Self::Unlimited => Self::UNLIMITED_SECS,
            Self::Seconds(s) => *s,
        }
    }

    /// Length of a fixed grant; `Ok(None)` for unlimited
    pub fn as_duration(&self) -> Result<Option<Duration>, DomainError> {
        match *self {
            Self::Unlimited => Ok(None),
            Self::Seconds(s) if s > 0 => Duration::try_seconds(s)
                .map(Some)
                .ok_or(DomainError::InvalidDuration(s)),
            Self::Seconds(s) => Err(DomainError::InvalidDuration(s)),
        }
    }

    #[inline]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl From<GrantDuration> for i64 {
    fn from(d: GrantDuration) -> Self {
        d.as_secs()
    }
}

impl TryFrom<i64> for GrantDuration {
    type Error = DomainError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}
