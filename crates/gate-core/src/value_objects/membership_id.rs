//! Membership id - the external credential a principal submits

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// External credential identifier, trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipId(String);

impl MembershipId {
    /// Wrap a value read back from storage or produced by trusted code.
    /// User input goes through [`MembershipIdPolicy::validate`].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when every character is an ASCII digit (also a valid principal id)
    pub fn is_numeric(&self) -> bool {
        let digits = self.0.strip_prefix(['-', '+']).unwrap_or(&self.0);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for MembershipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MembershipId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates submitted membership ids against a configured pattern.
///
/// The pattern must match the whole (trimmed) input, not a substring.
#[derive(Debug, Clone)]
pub struct MembershipIdPolicy {
    /// `None` accepts any non-empty id
    pattern: Option<Regex>,
}

impl MembershipIdPolicy {
    /// Build a policy from a configured pattern
    pub fn new(pattern: &str) -> Result<Self, DomainError> {
        let anchored = format!("^(?:{pattern})$");
        let pattern = Regex::new(&anchored)
            .map_err(|e| DomainError::ValidationError(format!("invalid id pattern: {e}")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Policy that accepts any non-empty id
    pub fn permissive() -> Self {
        Self { pattern: None }
    }

    pub fn validate(&self, raw: &str) -> Result<MembershipId, DomainError> {
        let trimmed = raw.trim();
        let matches = self.pattern.as_ref().map_or(true, |p| p.is_match(trimmed));
        if trimmed.is_empty() || !matches {
            return Err(DomainError::InvalidMembershipId(trimmed.to_string()));
        }
        Ok(MembershipId(trimmed.to_string()))
    }
}

impl Default for MembershipIdPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}
