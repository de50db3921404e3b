//! Principal entity - a chat-platform account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::PrincipalId;

/// A chat-platform account known to the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile metadata refreshed on every interaction (last write wins)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalProfile {
    pub id: PrincipalId,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl PrincipalProfile {
    pub fn new(id: PrincipalId) -> Self {
        Self {
            id,
            handle: None,
            display_name: None,
        }
    }

    /// Set the handle, dropping a leading `@` and blank values
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = normalize_handle(&handle.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.display_name = (!name.trim().is_empty()).then(|| name.trim().to_string());
        self
    }

    /// Handle with its `@` prefix and surrounding whitespace removed
    pub fn normalized_handle(&self) -> Option<String> {
        self.handle.as_deref().and_then(normalize_handle)
    }
}

fn normalize_handle(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('@');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
