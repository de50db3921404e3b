//! Join-link service
//!
//! Join-request links are created once per endpoint and cached in the store.

use gate_common::AppError;
use gate_core::EndpointId;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Join-link service
pub struct JoinLinkService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> JoinLinkService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cached link for `endpoint`, created on first need
    #[instrument(skip(self))]
    pub async fn ensure_link(&self, endpoint: EndpointId) -> ServiceResult<String> {
        if let Some(cached) = self.ctx.link_repo().get(endpoint).await? {
            return Ok(cached.link);
        }

        let label = self.ctx.join_link_label(endpoint);
        let link = self
            .ctx
            .endpoint_client()
            .create_join_link(endpoint, label.as_deref())
            .await
            .map_err(|e| AppError::ExternalService(format!("join link for {endpoint}: {e}")))?;

        self.ctx.link_repo().upsert(endpoint, &link).await?;
        info!(endpoint = %endpoint, "Join link cached");
        Ok(link)
    }

    /// Links for every configured endpoint; failing endpoints are skipped
    pub async fn links_for_all_endpoints(&self) -> Vec<String> {
        let mut links = Vec::with_capacity(self.ctx.endpoints().len());
        for &endpoint in self.ctx.endpoints() {
            match self.ensure_link(endpoint).await {
                Ok(link) => links.push(link),
                Err(e) => warn!(endpoint = %endpoint, error = %e, "Join link unavailable"),
            }
        }
        links
    }
}
