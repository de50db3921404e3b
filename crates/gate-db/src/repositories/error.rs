//! Error handling utilities for repositories

use gate_core::error::DomainError;
use gate_core::traits::MemberLookup;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "member not found" error
pub fn member_not_found(lookup: &MemberLookup) -> DomainError {
    DomainError::MemberNotFound(lookup.to_string())
}

/// Create a "binding conflict" error for a lost race on a unique key
pub fn binding_conflict(membership_id: &str) -> DomainError {
    DomainError::MembershipConflict(format!(
        "membership id {membership_id} was claimed concurrently"
    ))
}
