//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and, where there is something to
//! check, `Validate`.

use gate_core::{PrincipalId, PrincipalProfile};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Principal-facing Requests
// ============================================================================

/// Credential submission on behalf of a principal
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionRequest {
    pub principal_id: PrincipalId,

    #[validate(length(max = 64, message = "Handle must be at most 64 characters"))]
    pub handle: Option<String>,

    #[validate(length(max = 256, message = "Display name must be at most 256 characters"))]
    pub display_name: Option<String>,

    #[validate(length(min = 1, max = 256, message = "Membership id must be 1-256 characters"))]
    pub membership_id: String,
}

impl SubmissionRequest {
    /// Profile metadata carried by the submission
    pub fn profile(&self) -> PrincipalProfile {
        let mut profile = PrincipalProfile::new(self.principal_id);
        if let Some(handle) = &self.handle {
            profile = profile.with_handle(handle.as_str());
        }
        if let Some(name) = &self.display_name {
            profile = profile.with_display_name(name.as_str());
        }
        profile
    }
}

/// Join request seen at an endpoint
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinRequest {
    pub principal_id: PrincipalId,
}

// ============================================================================
// Admin Requests
// ============================================================================

/// Confirm a member for a duration; `0` grants unlimited access
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmRequest {
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_secs: i64,
}

/// Grant the admin role
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddAdminRequest {
    #[serde(default)]
    pub is_top_level: bool,
}

/// Set a principal's preferred locale
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocaleRequest {
    #[validate(length(min = 2, max = 16, message = "Locale must be 2-16 characters"))]
    pub locale: String,
}

/// `?scope=&format=` for the export endpoint; defaults to `all` as JSON
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub scope: Option<String>,
    pub format: Option<String>,
}
