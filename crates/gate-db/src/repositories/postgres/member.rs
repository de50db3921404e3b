//! PostgreSQL implementation of MemberRepository
//!
//! Multi-row mutations take transaction-scoped advisory locks on the
//! contended keys (membership id, principal id) in sorted order, then lock
//! the member rows themselves with `FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use gate_core::binding::{BindingDecision, BindingOutcome, BindingRequest};
use gate_core::entities::{Member, Transition};
use gate_core::traits::{MemberLookup, MemberRepository, RepoResult};
use gate_core::value_objects::{MembershipId, PrincipalId};

use crate::models::MemberModel;
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

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn membership_key(id: &MembershipId) -> String {
    format!("membership:{id}")
}

fn principal_key(id: PrincipalId) -> String {
    format!("principal:{id}")
}

/// Serialize concurrent writers on the given keys until the transaction ends
async fn lock_keys(tx: &mut Transaction<'_, Postgres>, mut keys: Vec<String>) -> RepoResult<()> {
    keys.sort();
    keys.dedup();
    for key in &keys {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;
    }
    Ok(())
}

async fn fetch_by_id(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepoResult<Member> {
    let model = sqlx::query_as::<_, MemberModel>(concat!(member_select!(), "WHERE m.id = $1"))
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_db_error)?;
    Ok(model.into())
}

async fn fetch_locked(
    tx: &mut Transaction<'_, Postgres>,
    lookup: &MemberLookup,
) -> RepoResult<Option<Member>> {
    let model = match lookup {
        MemberLookup::Id(id) => {
            sqlx::query_as::<_, MemberModel>(concat!(
                member_select!(),
                "WHERE m.id = $1 FOR UPDATE OF m"
            ))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
        }
        MemberLookup::Membership(id) => {
            sqlx::query_as::<_, MemberModel>(concat!(
                member_select!(),
                "WHERE m.membership_id = $1 FOR UPDATE OF m"
            ))
            .bind(id.as_str())
            .fetch_optional(&mut **tx)
            .await
        }
        MemberLookup::Principal(id) => {
            sqlx::query_as::<_, MemberModel>(concat!(
                member_select!(),
                "WHERE m.principal_id = $1 FOR UPDATE OF m"
            ))
            .bind(id.into_inner())
            .fetch_optional(&mut **tx)
            .await
        }
    }
    .map_err(map_db_error)?;

    Ok(model.map(Member::from))
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, MemberModel>(concat!(member_select!(), "WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Member::from))
    }

    #[instrument(skip(self))]
    async fn find_by_membership_id(
        &self,
        membership_id: &MembershipId,
    ) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            "WHERE m.membership_id = $1"
        ))
        .bind(membership_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Member::from))
    }

    #[instrument(skip(self))]
    async fn find_by_principal(&self, principal_id: PrincipalId) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            "WHERE m.principal_id = $1"
        ))
        .bind(principal_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Member::from))
    }

    #[instrument(skip(self))]
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Member>> {
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Ok(None);
        }

        let result = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            "WHERE LOWER(p.handle) = LOWER($1) ORDER BY p.updated_at DESC LIMIT 1"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Member::from))
    }

    #[instrument(skip(self, request), fields(membership_id = %request.membership_id, principal_id = %request.principal.id))]
    async fn upsert_binding(&self, request: &BindingRequest) -> RepoResult<BindingOutcome> {
        let principal_id = request.principal.id.into_inner();
        let membership_id = request.membership_id.as_str();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_keys(
            &mut tx,
            vec![
                membership_key(&request.membership_id),
                principal_key(request.principal.id),
            ],
        )
        .await?;

        sqlx::query(
            r"
            INSERT INTO principals (id, handle, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET handle = EXCLUDED.handle, display_name = EXCLUDED.display_name, updated_at = NOW()
            ",
        )
        .bind(principal_id)
        .bind(request.principal.normalized_handle())
        .bind(&request.principal.display_name)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let by_membership = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM members WHERE membership_id = $1 FOR UPDATE",
        )
        .bind(membership_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let by_principal =
            sqlx::query_scalar::<_, i64>("SELECT id FROM members WHERE principal_id = $1 FOR UPDATE")
                .bind(principal_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;

        let decision = BindingDecision::decide(by_membership, by_principal);
        let member_id = match decision {
            BindingDecision::Create => sqlx::query_scalar::<_, i64>(
                r"
                INSERT INTO members (membership_id, principal_id, is_confirmed)
                VALUES ($1, $2, $3)
                RETURNING id
                ",
            )
            .bind(membership_id)
            .bind(principal_id)
            .bind(request.initial_confirmed)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, || binding_conflict(membership_id)))?,

            BindingDecision::RebindPrincipal { member_id } => {
                sqlx::query("UPDATE members SET principal_id = $2, updated_at = NOW() WHERE id = $1")
                    .bind(member_id)
                    .bind(principal_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                member_id
            }

            BindingDecision::RebindMembership { member_id } => {
                sqlx::query("UPDATE members SET membership_id = $2, updated_at = NOW() WHERE id = $1")
                    .bind(member_id)
                    .bind(membership_id)
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
                sqlx::query("UPDATE members SET principal_id = NULL, updated_at = NOW() WHERE id = $1")
                    .bind(detached_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                sqlx::query("UPDATE members SET principal_id = $2, updated_at = NOW() WHERE id = $1")
                    .bind(member_id)
                    .bind(principal_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
                member_id
            }

            BindingDecision::NoOp { member_id } => member_id,
        };

        let member = fetch_by_id(&mut tx, member_id).await?;
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
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut member = fetch_locked(&mut tx, lookup)
            .await?
            .ok_or_else(|| member_not_found(lookup))?;
        member.apply(&transition)?;

        sqlx::query(
            r"
            UPDATE members
            SET is_confirmed = $2, is_banned = $3, expires_at = $4,
                warn_sent_at = $5, grace_notified_at = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(member.id)
        .bind(member.is_confirmed)
        .bind(member.is_banned)
        .bind(member.expires_at)
        .bind(member.warn_sent_at)
        .bind(member.grace_notified_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(member)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, MemberModel>(concat!(member_select!(), "ORDER BY m.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self))]
    async fn due_for_warning(
        &self,
        now: DateTime<Utc>,
        lead: Duration,
    ) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed
              AND m.principal_id IS NOT NULL
              AND m.expires_at IS NOT NULL
              AND m.warn_sent_at IS NULL
              AND m.expires_at > $1
              AND m.expires_at <= $2
            ORDER BY m.expires_at
            "
        ))
        .bind(now)
        .bind(now + lead)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self))]
    async fn due_for_grace_notice(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed
              AND m.principal_id IS NOT NULL
              AND m.expires_at IS NOT NULL
              AND m.grace_notified_at IS NULL
              AND m.expires_at <= $1
              AND m.expires_at >= $2
            ORDER BY m.expires_at
            "
        ))
        .bind(now)
        .bind(now - grace)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self))]
    async fn due_for_hard_expiry(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, MemberModel>(concat!(
            member_select!(),
            r"
            WHERE m.is_confirmed
              AND m.expires_at IS NOT NULL
              AND m.expires_at <= $1
            ORDER BY m.expires_at
            "
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: i64) -> RepoResult<Option<Member>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut keys = vec![membership_key(&current.membership_id)];
        keys.extend(current.principal_id.map(principal_key));
        lock_keys(&mut tx, keys).await?;

        let Some(member) = fetch_locked(&mut tx, &MemberLookup::Id(id)).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if let Some(principal_id) = member.principal_id {
            sqlx::query("DELETE FROM principals WHERE id = $1")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMemberRepository>();
    }

    #[test]
    fn test_lock_keys_are_namespaced() {
        assert_eq!(membership_key(&MembershipId::new("42")), "membership:42");
        assert_eq!(principal_key(PrincipalId::new(42)), "principal:42");
    }
}
