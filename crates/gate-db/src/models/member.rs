//! Member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `members` joined with the bound principal's profile
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: i64,
    pub membership_id: String,
    pub principal_id: Option<i64>,
    pub is_confirmed: bool,
    pub is_banned: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub warn_sent_at: Option<DateTime<Utc>>,
    pub grace_notified_at: Option<DateTime<Utc>>,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SqliteMemberModel {
    pub id: i64,
    pub membership_id: String,
    pub principal_id: Option<i64>,
    pub is_confirmed: bool,
    pub is_banned: bool,
    pub expires_at: Option<i64>,
    pub warn_sent_at: Option<i64>,
    pub grace_notified_at: Option<i64>,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}
