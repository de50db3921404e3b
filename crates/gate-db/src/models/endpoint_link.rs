//! Endpoint link cache model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EndpointLinkModel {
    pub endpoint_id: i64,
    pub link: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SqliteEndpointLinkModel {
    pub endpoint_id: i64,
    pub link: String,
    pub updated_at: i64,
}
