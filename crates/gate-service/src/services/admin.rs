//! Admin service
//!
//! Administrator roles. The configured root admin is always a top-level
//! admin whether or not it has a stored row.

use gate_core::{Admin, DomainError, PrincipalId};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn is_root(&self, principal: PrincipalId) -> bool {
        self.ctx.root_admin() == Some(principal)
    }

    pub async fn is_admin(&self, principal: PrincipalId) -> ServiceResult<bool> {
        if self.is_root(principal) {
            return Ok(true);
        }
        Ok(self.ctx.admin_repo().is_admin(principal).await?)
    }

    pub async fn is_top_level(&self, principal: PrincipalId) -> ServiceResult<bool> {
        if self.is_root(principal) {
            return Ok(true);
        }
        let admin = self.ctx.admin_repo().find(principal).await?;
        Ok(admin.is_some_and(|a| a.is_top_level))
    }

    pub async fn require_admin(&self, principal: PrincipalId) -> ServiceResult<()> {
        if self.is_admin(principal).await? {
            Ok(())
        } else {
            Err(DomainError::NotAdmin.into())
        }
    }

    pub async fn require_top_level(&self, principal: PrincipalId) -> ServiceResult<()> {
        if self.is_top_level(principal).await? {
            Ok(())
        } else {
            Err(DomainError::NotTopLevelAdmin.into())
        }
    }

    /// Stored admins, with the root admin first when configured
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<Admin>> {
        let mut admins = self.ctx.admin_repo().list().await?;
        if let Some(root) = self.ctx.root_admin() {
            admins.retain(|a| a.principal_id != root);
            admins.insert(0, Admin::new(root, true));
        }
        Ok(admins)
    }

    /// Grant or update the admin role. Only top-level admins may do this.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        actor: PrincipalId,
        target: PrincipalId,
        is_top_level: bool,
    ) -> ServiceResult<Admin> {
        self.require_top_level(actor).await?;
        if self.is_root(target) {
            return Err(ServiceError::validation("the root admin is configured, not stored"));
        }

        let admin = self.ctx.admin_repo().add(target, is_top_level).await?;
        info!(actor = %actor, target = %target, is_top_level, "Admin role granted");
        Ok(admin)
    }

    /// Revoke the admin role. Only top-level admins may do this.
    #[instrument(skip(self))]
    pub async fn remove(&self, actor: PrincipalId, target: PrincipalId) -> ServiceResult<()> {
        self.require_top_level(actor).await?;
        if self.is_root(target) {
            return Err(ServiceError::validation("the root admin cannot be removed"));
        }

        if !self.ctx.admin_repo().remove(target).await? {
            return Err(ServiceError::not_found("Admin", target.to_string()));
        }
        info!(actor = %actor, target = %target, "Admin role revoked");
        Ok(())
    }
}
