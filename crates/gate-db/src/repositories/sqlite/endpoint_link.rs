//! SQLite implementation of EndpointLinkRepository

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use gate_core::entities::EndpointLink;
use gate_core::traits::{EndpointLinkRepository, RepoResult};
use gate_core::value_objects::EndpointId;

use crate::models::SqliteEndpointLinkModel;
use crate::pool::SqliteDb;
use crate::repositories::error::map_db_error;

/// SQLite implementation of EndpointLinkRepository
#[derive(Clone)]
pub struct SqliteEndpointLinkRepository {
    db: SqliteDb,
}

impl SqliteEndpointLinkRepository {
    /// Create a new SqliteEndpointLinkRepository
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EndpointLinkRepository for SqliteEndpointLinkRepository {
    #[instrument(skip(self))]
    async fn get(&self, endpoint_id: EndpointId) -> RepoResult<Option<EndpointLink>> {
        let result = sqlx::query_as::<_, SqliteEndpointLinkModel>(
            "SELECT endpoint_id, link, updated_at FROM endpoint_links WHERE endpoint_id = ?1",
        )
        .bind(endpoint_id.into_inner())
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        result.map(EndpointLink::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn upsert(&self, endpoint_id: EndpointId, link: &str) -> RepoResult<EndpointLink> {
        let _writer = self.db.writer().await;
        let model = sqlx::query_as::<_, SqliteEndpointLinkModel>(
            r"
            INSERT INTO endpoint_links (endpoint_id, link, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (endpoint_id) DO UPDATE
            SET link = excluded.link, updated_at = excluded.updated_at
            RETURNING endpoint_id, link, updated_at
            ",
        )
        .bind(endpoint_id.into_inner())
        .bind(link)
        .bind(Utc::now().timestamp())
        .fetch_one(self.db.pool())
        .await
        .map_err(map_db_error)?;

        EndpointLink::try_from(model)
    }
}
