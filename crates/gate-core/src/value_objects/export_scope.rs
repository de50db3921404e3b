//! Export scope filter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Member;
use crate::error::DomainError;

/// Which members an export includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    #[default]
    All,
    /// Confirmed, unbanned, and not expired
    Active,
    /// Confirmed with a passed expiry
    Expired,
    Banned,
}

impl ExportScope {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "banned" => Ok(Self::Banned),
            other => Err(DomainError::InvalidScope(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Banned => "banned",
        }
    }

    /// Whether `member` belongs in this scope at `now`
    pub fn matches(&self, member: &Member, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Active => {
                !member.is_banned
                    && member.is_confirmed
                    && member.expires_at.map_or(true, |exp| exp > now)
            }
            Self::Expired => {
                member.is_confirmed && member.expires_at.is_some_and(|exp| exp <= now)
            }
            Self::Banned => member.is_banned,
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
