//! SQLite implementation of AdminRepository

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use gate_core::entities::Admin;
use gate_core::traits::{AdminRepository, RepoResult};
use gate_core::value_objects::PrincipalId;

use crate::models::SqliteAdminModel;
use crate::pool::SqliteDb;
use crate::repositories::error::map_db_error;

/// SQLite implementation of AdminRepository
#[derive(Clone)]
pub struct SqliteAdminRepository {
    db: SqliteDb,
}

impl SqliteAdminRepository {
    /// Create a new SqliteAdminRepository
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for SqliteAdminRepository {
    #[instrument(skip(self))]
    async fn is_admin(&self, id: PrincipalId) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE principal_id = ?1)",
        )
        .bind(id.into_inner())
        .fetch_one(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find(&self, id: PrincipalId) -> RepoResult<Option<Admin>> {
        let result = sqlx::query_as::<_, SqliteAdminModel>(
            "SELECT principal_id, is_top_level, created_at FROM admins WHERE principal_id = ?1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Admin::from))
    }

    #[instrument(skip(self))]
    async fn add(&self, id: PrincipalId, is_top_level: bool) -> RepoResult<Admin> {
        let _writer = self.db.writer().await;
        let model = sqlx::query_as::<_, SqliteAdminModel>(
            r"
            INSERT INTO admins (principal_id, is_top_level, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (principal_id) DO UPDATE SET is_top_level = excluded.is_top_level
            RETURNING principal_id, is_top_level, created_at
            ",
        )
        .bind(id.into_inner())
        .bind(is_top_level)
        .bind(Utc::now().timestamp())
        .fetch_one(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: PrincipalId) -> RepoResult<bool> {
        let _writer = self.db.writer().await;
        let result = sqlx::query("DELETE FROM admins WHERE principal_id = ?1")
            .bind(id.into_inner())
            .execute(self.db.pool())
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Admin>> {
        let results = sqlx::query_as::<_, SqliteAdminModel>(
            "SELECT principal_id, is_top_level, created_at FROM admins ORDER BY principal_id",
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Admin::from).collect())
    }
}
