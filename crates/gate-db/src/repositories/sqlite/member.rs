//! SQLite implementation of MemberRepository
//!
//! Mutations hold the store's writer lock for the whole transaction, which
//! gives the same per-key serialization the PostgreSQL engine gets from
//! advisory and row locks.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, instrument};

use gate_core::binding::{BindingDecision, BindingOutcome, BindingRequest};
use gate_core::entities::{Member, Transition};
use gate_core::traits::{MemberLookup, MemberRepository, RepoResult};
use gate_core::value_objects::{MembershipId, PrincipalId};

use crate::mappers::{sqlite_members, sqlite_timestamps};
use crate::models::SqliteMemberModel;
use crate::pool::SqliteDb;
use crate::repositories::error::{
    binding_conflict, map_db_error, map_unique_violation, member_not_found,
};

macro_rules! member_select {
    () => {
        r"
        SELECT m.id, m.membership_id, m.principal_id, m.is_confirmed, m.is_banned,
               m.expires_at, m.warn_sent_at, m.grace_notified_at,
               p.handle, p.display_name
        FROM members m
        LEFT JOIN principals p ON p.id = m.principal_id
        "
    };
}

/// SQLite implementation of MemberRepository
#[derive(Clone)]
pub struct SqliteMemberRepository {
    db: SqliteDb,
}

impl SqliteMemberRepository {
    /// Create a new SqliteMemberRepository
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

async fn fetch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    lookup: &MemberLookup,
) -> RepoResult<Option<Member>> {
    let model = match lookup {
        MemberLookup::Id(id) => {
            sqlx::query_as::<_, SqliteMemberModel>(concat!(member_select!(), "WHERE m.id = ?1"))
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
        }
        MemberLookup::Membership(id) => {
            sqlx::query_as::<_, SqliteMemberModel>(concat!(
                member_select!(),
                "WHERE m.membership_id = ?1"
            ))
            .bind(id.as_str())
            .fetch_optional(&mut **tx)
            .await
        }
        MemberLookup::Principal(id) => {
            sqlx::query_as::<_, SqliteMemberModel>(concat!(
                member_select!(),
                "WHERE m.principal_id = ?1"
            ))
            .bind(id.into_inner())
            .fetch_optional(&mut **tx)
            .await
        }
    }
    .map_err(map_db_error)?;

    model.map(Member::try_from).transpose()
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Member>> {
        let result =
            sqlx::query_as::<_, SqliteMemberModel>(concat!(member_select!(), "WHERE m.id = ?1"))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await
                .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_membership_id(
        &self,
        membership_id: &MembershipId,
    ) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            "WHERE m.membership_id = ?1"
        ))
        .bind(membership_id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_principal(&self, principal_id: PrincipalId) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            "WHERE m.principal_id = ?1"
        ))
        .bind(principal_id.into_inner())
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Member>> {
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Ok(None);
        }

        let result = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            "WHERE p.handle = ?1 COLLATE NOCASE ORDER BY p.updated_at DESC LIMIT 1"
        ))
        .bind(handle)
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    #[instrument(skip(self, request), fields(membership_id = %request.membership_id, principal_id = %request.principal.id))]
    async fn upsert_binding(&self, request: &BindingRequest) -> RepoResult<BindingOutcome> {
        let principal_id = request.principal.id.into_inner();
        let membership_id = request.membership_id.as_str();
        let now = Utc::now().timestamp();

        let _writer = self.db.writer().await;
        let mut tx = self.db.pool().begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO principals (id, handle, display_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (id) DO UPDATE
            SET handle = excluded.handle, display_name = excluded.display_name,
                updated_at = excluded.updated_at
            ",
        )
        .bind(principal_id)
        .bind(request.principal.normalized_handle())
        .bind(&request.principal.display_name)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let by_membership =
            sqlx::query_scalar::<_, i64>("SELECT id FROM members WHERE membership_id = ?1")
                .bind(membership_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;

        let by_principal =
            sqlx::query_scalar::<_, i64>("SELECT id FROM members WHERE principal_id = ?1")
                .bind(principal_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;

        let decision = BindingDecision::decide(by_membership, by_principal);
        let member_id = match decision {
            BindingDecision::Create => sqlx::query_scalar::<_, i64>(
                r"
                INSERT INTO members (membership_id, principal_id, is_confirmed, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                RETURNING id
                ",
            )
            .bind(membership_id)
            .bind(principal_id)
            .bind(request.initial_confirmed)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, || binding_conflict(membership_id)))?,

            BindingDecision::RebindPrincipal { member_id } => {
                sqlx::query("UPDATE members SET principal_id = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(member_id)
                    .bind(principal_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                member_id
            }

            BindingDecision::RebindMembership { member_id } => {
                sqlx::query("UPDATE members SET membership_id = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(member_id)
                    .bind(membership_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_unique_violation(e, || binding_conflict(membership_id)))?;
                member_id
            }

            BindingDecision::ResolveConflict {
                member_id,
                detached_id,
            } => {
                // Detach first: principal_id is unique
                sqlx::query("UPDATE members SET principal_id = NULL, updated_at = ?2 WHERE id = ?1")
                    .bind(detached_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                sqlx::query("UPDATE members SET principal_id = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(member_id)
                    .bind(principal_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                member_id
            }

            BindingDecision::NoOp { member_id } => member_id,
        };

        let member = fetch_in_tx(&mut tx, &MemberLookup::Id(member_id))
            .await?
            .ok_or_else(|| member_not_found(&MemberLookup::Id(member_id)))?;
        tx.commit().await.map_err(map_db_error)?;

        debug!(decision = decision.as_str(), member_id, "Binding reconciled");
        Ok(BindingOutcome { decision, member })
    }

    #[instrument(skip(self))]
    async fn apply_transition(
        &self,
        lookup: &MemberLookup,
        transition: Transition,
    ) -> RepoResult<Member> {
        let _writer = self.db.writer().await;
        let mut tx = self.db.pool().begin().await.map_err(map_db_error)?;

        let mut member = fetch_in_tx(&mut tx, lookup)
            .await?
            .ok_or_else(|| member_not_found(lookup))?;
        member.apply(&transition)?;

        let [expires_at, warn_sent_at, grace_notified_at] = sqlite_timestamps(&member);
        sqlx::query(
            r"
            UPDATE members
            SET is_confirmed = ?2, is_banned = ?3, expires_at = ?4,
                warn_sent_at = ?5, grace_notified_at = ?6, updated_at = ?7
            WHERE id = ?1
            ",
        )
        .bind(member.id)
        .bind(member.is_confirmed)
        .bind(member.is_banned)
        .bind(expires_at)
        .bind(warn_sent_at)
        .bind(grace_notified_at)
        .bind(Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(member)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<Member>> {
        let results =
            sqlx::query_as::<_, SqliteMemberModel>(concat!(member_select!(), "ORDER BY m.id"))
                .fetch_all(self.db.pool())
                .await
                .map_err(map_db_error)?;

        sqlite_members(results)
    }

    #[instrument(skip(self))]
    async fn due_for_warning(
        &self,
        now: DateTime<Utc>,
        lead: Duration,
    ) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed = 1
              AND m.principal_id IS NOT NULL
              AND m.expires_at IS NOT NULL
              AND m.warn_sent_at IS NULL
              AND m.expires_at > ?1
              AND m.expires_at <= ?2
            ORDER BY m.expires_at
            "
        ))
        .bind(now.timestamp())
        .bind((now + lead).timestamp())
        .fetch_all(self.db.pool())
        .await
        .map_err(map_db_error)?;

        sqlite_members(results)
    }

    #[instrument(skip(self))]
    async fn due_for_grace_notice(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed = 1
              AND m.principal_id IS NOT NULL
              AND m.expires_at IS NOT NULL
              AND m.grace_notified_at IS NULL
              AND m.expires_at <= ?1
              AND m.expires_at >= ?2
            ORDER BY m.expires_at
            "
        ))
        .bind(now.timestamp())
        .bind((now - grace).timestamp())
        .fetch_all(self.db.pool())
        .await
        .map_err(map_db_error)?;

        sqlite_members(results)
    }

    #[instrument(skip(self))]
    async fn due_for_hard_expiry(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, SqliteMemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed = 1
              AND m.expires_at IS NOT NULL
              AND m.expires_at <= ?1
            ORDER BY m.expires_at
            "
        ))
        .bind(cutoff.timestamp())
        .fetch_all(self.db.pool())
        .await
        .map_err(map_db_error)?;

        sqlite_members(results)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: i64) -> RepoResult<Option<Member>> {
        let _writer = self.db.writer().await;
        let mut tx = self.db.pool().begin().await.map_err(map_db_error)?;

        let Some(member) = fetch_in_tx(&mut tx, &MemberLookup::Id(id)).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM members WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if let Some(principal_id) = member.principal_id {
            sqlx::query("DELETE FROM principals WHERE id = ?1")
                .bind(principal_id.into_inner())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        debug!(member_id = id, "Member removed");
        Ok(Some(member))
    }
}
