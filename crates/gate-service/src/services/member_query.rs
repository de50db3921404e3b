//! Member queries
//!
//! Admin-side lookups, endpoint presence, export and principal preferences.

use futures::future::join_all;
use gate_core::{DomainError, ExportRow, ExportScope, Member, MemberKey, PrincipalId};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Member query service
pub struct MemberQueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberQueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve an admin key: `@handle`, membership id, or principal id
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_key: &str) -> ServiceResult<Member> {
        let key = MemberKey::parse(raw_key)
            .ok_or_else(|| ServiceError::validation("member key must not be empty"))?;

        let found = match &key {
            MemberKey::Handle(handle) => self.ctx.member_repo().find_by_handle(handle).await?,
            MemberKey::Membership {
                id,
                principal_fallback,
            } => match self.ctx.member_repo().find_by_membership_id(id).await? {
                Some(member) => Some(member),
                None => match principal_fallback {
                    Some(principal) => self.ctx.member_repo().find_by_principal(*principal).await?,
                    None => None,
                },
            },
        };

        found.ok_or_else(|| DomainError::MemberNotFound(raw_key.trim().to_string()).into())
    }

    /// Whether `principal` is inside at least one configured endpoint
    ///
    /// Endpoints that cannot answer count as absent.
    #[instrument(skip(self), fields(endpoints = self.ctx.endpoints().len()))]
    pub async fn presence(&self, principal: PrincipalId) -> bool {
        let client = self.ctx.endpoint_client();
        let answers = join_all(self.ctx.endpoints().iter().map(|&endpoint| async move {
            (endpoint, client.is_present(endpoint, principal).await)
        }))
        .await;

        answers.into_iter().any(|(endpoint, answer)| match answer {
            Ok(present) => present,
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "Presence check failed");
                false
            }
        })
    }

    /// Members in `scope` with status derived now
    #[instrument(skip(self))]
    pub async fn export(&self, scope: ExportScope) -> ServiceResult<Vec<ExportRow>> {
        let rows = self
            .ctx
            .member_repo()
            .list_for_export(scope, self.ctx.now())
            .await?;
        Ok(rows)
    }

    pub async fn locale(&self, principal: PrincipalId) -> ServiceResult<Option<String>> {
        Ok(self.ctx.principal_repo().get_locale(principal).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_locale(&self, principal: PrincipalId, locale: &str) -> ServiceResult<()> {
        let locale = locale.trim();
        if locale.is_empty() {
            return Err(ServiceError::validation("locale must not be empty"));
        }
        self.ctx.principal_repo().set_locale(principal, locale).await?;
        Ok(())
    }
}
