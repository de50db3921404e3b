//! Numeric platform identifiers
//!
//! Principals (chat accounts) and access endpoints (channels/groups) are both
//! addressed by signed 64-bit ids assigned by the chat platform. Endpoint ids
//! are frequently negative, so neither type assumes a sign.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable id of a chat-platform account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(i64);

/// Id of one access-controlled endpoint where grants are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(i64);

/// Error when parsing an id from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid numeric id")]
    InvalidFormat,
}

impl PrincipalId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parse from string representation (surrounding whitespace allowed)
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| IdParseError::InvalidFormat)
    }
}

impl EndpointId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| IdParseError::InvalidFormat)
    }

    /// Parse a comma-separated endpoint list, skipping blank entries
    pub fn parse_list(s: &str) -> Result<Vec<Self>, IdParseError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PrincipalId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<PrincipalId> for i64 {
    fn from(id: PrincipalId) -> Self {
        id.0
    }
}

impl From<i64> for EndpointId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EndpointId> for i64 {
    fn from(id: EndpointId) -> Self {
        id.0
    }
}

impl std::str::FromStr for PrincipalId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::str::FromStr for EndpointId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
