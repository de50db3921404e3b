//! Admin role database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AdminModel {
    pub principal_id: i64,
    pub is_top_level: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SqliteAdminModel {
    pub principal_id: i64,
    pub is_top_level: bool,
    pub created_at: i64,
}
