//! Admin lookup key for a member record

use crate::value_objects::{MembershipId, PrincipalId};

/// How an administrator refers to a member.
///
/// `@name` is always a handle. Anything else is first tried as a membership
/// id; numeric keys fall back to a principal id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKey {
    Handle(String),
    Membership {
        id: MembershipId,
        principal_fallback: Option<PrincipalId>,
    },
}

impl MemberKey {
    /// Returns `None` for an empty key
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(handle) = raw.strip_prefix('@') {
            if handle.is_empty() {
                return None;
            }
            return Some(Self::Handle(handle.to_string()));
        }
        Some(Self::Membership {
            id: MembershipId::new(raw),
            principal_fallback: PrincipalId::parse(raw).ok(),
        })
    }
}
