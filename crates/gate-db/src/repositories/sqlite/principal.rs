//! SQLite implementation of PrincipalRepository

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use gate_core::entities::{Principal, PrincipalProfile};
use gate_core::traits::{PrincipalRepository, RepoResult};
use gate_core::value_objects::PrincipalId;

use crate::models::SqlitePrincipalModel;
use crate::pool::SqliteDb;
use crate::repositories::error::map_db_error;

/// SQLite implementation of PrincipalRepository
#[derive(Clone)]
pub struct SqlitePrincipalRepository {
    db: SqliteDb,
}

impl SqlitePrincipalRepository {
    /// Create a new SqlitePrincipalRepository
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PrincipalRepository for SqlitePrincipalRepository {
    #[instrument(skip(self))]
    async fn upsert_profile(&self, profile: &PrincipalProfile) -> RepoResult<Principal> {
        let _writer = self.db.writer().await;
        let model = sqlx::query_as::<_, SqlitePrincipalModel>(
            r"
            INSERT INTO principals (id, handle, display_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (id) DO UPDATE
            SET handle = excluded.handle, display_name = excluded.display_name,
                updated_at = excluded.updated_at
            RETURNING id, handle, display_name, locale, created_at, updated_at
            ",
        )
        .bind(profile.id.into_inner())
        .bind(profile.normalized_handle())
        .bind(&profile.display_name)
        .bind(Utc::now().timestamp())
        .fetch_one(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Principal::try_from(model)
    }

    #[instrument(skip(self))]
    async fn find(&self, id: PrincipalId) -> RepoResult<Option<Principal>> {
        let result = sqlx::query_as::<_, SqlitePrincipalModel>(
            r"
            SELECT id, handle, display_name, locale, created_at, updated_at
            FROM principals
            WHERE id = ?1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        result.map(Principal::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn get_locale(&self, id: PrincipalId) -> RepoResult<Option<String>> {
        let locale =
            sqlx::query_scalar::<_, Option<String>>("SELECT locale FROM principals WHERE id = ?1")
                .bind(id.into_inner())
                .fetch_optional(self.db.pool())
                .await
                .map_err(map_db_error)?;

        Ok(locale.flatten())
    }

    #[instrument(skip(self))]
    async fn set_locale(&self, id: PrincipalId, locale: &str) -> RepoResult<()> {
        let _writer = self.db.writer().await;
        sqlx::query(
            r"
            INSERT INTO principals (id, locale, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (id) DO UPDATE SET locale = excluded.locale, updated_at = excluded.updated_at
            ",
        )
        .bind(id.into_inner())
        .bind(locale)
        .bind(Utc::now().timestamp())
        .execute(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PrincipalId) -> RepoResult<bool> {
        let _writer = self.db.writer().await;
        let result = sqlx::query("DELETE FROM principals WHERE id = ?1")
            .bind(id.into_inner())
            .execute(self.db.pool())
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
