//! PostgreSQL implementation of PrincipalRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use gate_core::entities::{Principal, PrincipalProfile};
use gate_core::traits::{PrincipalRepository, RepoResult};
use gate_core::value_objects::PrincipalId;

use crate::models::PrincipalModel;
use crate::repositories::error::map_db_error;

/// PostgreSQL implementation of PrincipalRepository
#[derive(Clone)]
pub struct PgPrincipalRepository {
    pool: PgPool,
}

impl PgPrincipalRepository {
    /// Create a new PgPrincipalRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalRepository for PgPrincipalRepository {
    #[instrument(skip(self))]
    async fn upsert_profile(&self, profile: &PrincipalProfile) -> RepoResult<Principal> {
        let model = sqlx::query_as::<_, PrincipalModel>(
            r"
            INSERT INTO principals (id, handle, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET handle = EXCLUDED.handle, display_name = EXCLUDED.display_name, updated_at = NOW()
            RETURNING id, handle, display_name, locale, created_at, updated_at
            ",
        )
        .bind(profile.id.into_inner())
        .bind(profile.normalized_handle())
        .bind(&profile.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn find(&self, id: PrincipalId) -> RepoResult<Option<Principal>> {
        let result = sqlx::query_as::<_, PrincipalModel>(
            r"
            SELECT id, handle, display_name, locale, created_at, updated_at
            FROM principals
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Principal::from))
    }

    #[instrument(skip(self))]
    async fn get_locale(&self, id: PrincipalId) -> RepoResult<Option<String>> {
        let locale = sqlx::query_scalar::<_, Option<String>>(
            "SELECT locale FROM principals WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(locale.flatten())
    }

    #[instrument(skip(self))]
    async fn set_locale(&self, id: PrincipalId, locale: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO principals (id, locale)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET locale = EXCLUDED.locale, updated_at = NOW()
            ",
        )
        .bind(id.into_inner())
        .bind(locale)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PrincipalId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM principals WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
