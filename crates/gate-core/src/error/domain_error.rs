//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Principal not found: {0}")]
    PrincipalNotFound(i64),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Membership id does not match the configured pattern: {0}")]
    InvalidMembershipId(String),

    #[error("Unknown export scope: {0}")]
    InvalidScope(String),

    #[error("Invalid grant duration: {0} (must be 0 or a positive number of seconds within range)")]
    InvalidDuration(i64),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Principal is not an administrator")]
    NotAdmin,

    #[error("Only top-level administrators may manage administrators")]
    NotTopLevelAdmin,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Membership binding conflict: {0}")]
    MembershipConflict(String),

    #[error("Member is banned: {0}")]
    MemberBanned(String),

    /// A scheduled step no longer matches the stored record
    #[error("Member terms changed since scheduling: {0}")]
    NoLongerDue(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::PrincipalNotFound(_) => "UNKNOWN_PRINCIPAL",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidMembershipId(_) => "INVALID_MEMBERSHIP_ID",
            Self::InvalidScope(_) => "INVALID_SCOPE",
            Self::InvalidDuration(_) => "INVALID_DURATION",

            // Authorization
            Self::NotAdmin => "NOT_ADMIN",
            Self::NotTopLevelAdmin => "NOT_TOP_LEVEL_ADMIN",

            // Conflict
            Self::MembershipConflict(_) => "MEMBERSHIP_CONFLICT",
            Self::MemberBanned(_) => "MEMBER_BANNED",
            Self::NoLongerDue(_) => "NO_LONGER_DUE",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MemberNotFound(_) | Self::PrincipalNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidMembershipId(_)
                | Self::InvalidScope(_)
                | Self::InvalidDuration(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAdmin | Self::NotTopLevelAdmin)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::MembershipConflict(_) | Self::MemberBanned(_) | Self::NoLongerDue(_)
        )
    }
}

/// Failure reported by an access endpoint (ban/unban/link creation)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EndpointError(pub String);

impl EndpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure delivering a notification to a principal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The principal blocked the bot or cannot be reached
    #[error("principal unreachable: {0}")]
    Unreachable(String),

    #[error("delivery failed: {0}")]
    Transport(String),
}
