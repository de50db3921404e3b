//! Principal database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PrincipalModel {
    pub id: i64,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SqlitePrincipalModel {
    pub id: i64,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
