//! Entity to model mappers
//!
//! - `From<Model> for Entity`: PostgreSQL rows to domain objects
//! - `TryFrom<SqliteModel> for Entity`: SQLite rows, whose unix-second
//!   timestamps are range-checked on the way in

mod admin;
mod endpoint_link;
mod member;
mod principal;

pub(crate) use member::{sqlite_members, sqlite_timestamps};

use chrono::{DateTime, Utc};
use gate_core::DomainError;

/// Convert stored unix seconds to a timestamp
pub fn from_unix(secs: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DomainError::DatabaseError(format!("timestamp out of range: {secs}")))
}

pub fn from_unix_opt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, DomainError> {
    secs.map(from_unix).transpose()
}

pub fn to_unix_opt(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(|t| t.timestamp())
}
