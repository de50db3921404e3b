//! Admin role entity

use serde::Serialize;

use crate::value_objects::PrincipalId;

/// A principal with an elevated role.
///
/// Top-level admins may add and remove other admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub principal_id: PrincipalId,
    pub is_top_level: bool,
}

impl Admin {
    pub fn new(principal_id: PrincipalId, is_top_level: bool) -> Self {
        Self {
            principal_id,
            is_top_level,
        }
    }
}
