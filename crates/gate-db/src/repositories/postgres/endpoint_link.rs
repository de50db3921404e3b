//! PostgreSQL implementation of EndpointLinkRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use gate_core::entities::EndpointLink;
use gate_core::traits::{EndpointLinkRepository, RepoResult};
use gate_core::value_objects::EndpointId;

use crate::models::EndpointLinkModel;
use crate::repositories::error::map_db_error;

/// PostgreSQL implementation of EndpointLinkRepository
#[derive(Clone)]
pub struct PgEndpointLinkRepository {
    pool: PgPool,
}

impl PgEndpointLinkRepository {
    /// Create a new PgEndpointLinkRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointLinkRepository for PgEndpointLinkRepository {
    #[instrument(skip(self))]
    async fn get(&self, endpoint_id: EndpointId) -> RepoResult<Option<EndpointLink>> {
        let result = sqlx::query_as::<_, EndpointLinkModel>(
            "SELECT endpoint_id, link, updated_at FROM endpoint_links WHERE endpoint_id = $1",
        )
        .bind(endpoint_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(EndpointLink::from))
    }

    #[instrument(skip(self))]
    async fn upsert(&self, endpoint_id: EndpointId, link: &str) -> RepoResult<EndpointLink> {
        let model = sqlx::query_as::<_, EndpointLinkModel>(
            r"
            INSERT INTO endpoint_links (endpoint_id, link)
            VALUES ($1, $2)
            ON CONFLICT (endpoint_id) DO UPDATE SET link = EXCLUDED.link, updated_at = NOW()
            RETURNING endpoint_id, link, updated_at
            ",
        )
        .bind(endpoint_id.into_inner())
        .bind(link)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }
}
