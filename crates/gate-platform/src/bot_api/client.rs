//! Bot API client.
//!
//! Every method is a JSON `POST {api_base}/bot{token}/{method}`; the answer
//! is a [`BotResponse`] envelope whose `ok` flag decides success.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use gate_core::{EndpointClient, EndpointError, EndpointId, PrincipalId};

use super::types::{
    BanChatMember, BotResponse, ChatMember, CreateChatInviteLink, GetChatMember, InviteLink,
    UnbanChatMember,
};
use crate::http::{PlatformError, PlatformResult};

/// Endpoint operations over the bot HTTP API
#[derive(Clone)]
pub struct BotApiClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for BotApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl BotApiClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Create a client from gate-common config
    pub fn from_config(http: reqwest::Client, config: &gate_common::PlatformConfig) -> Self {
        Self::new(http, config.api_base.clone(), config.bot_token.clone())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> PlatformResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.method_url(method)).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: BotResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(PlatformError::Serialization(e)),
            Err(_) => {
                return Err(PlatformError::Rejected {
                    method,
                    status: status.as_u16(),
                    description: String::from_utf8_lossy(&bytes).into_owned(),
                })
            }
        };

        if !envelope.ok {
            return Err(PlatformError::Rejected {
                method,
                status: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope
                    .description
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        envelope.result.ok_or(PlatformError::UnexpectedResponse {
            method,
            detail: "missing result".to_string(),
        })
    }
}

#[async_trait]
impl EndpointClient for BotApiClient {
    #[instrument(skip(self), fields(endpoint = %endpoint, principal = %principal))]
    async fn ban(&self, endpoint: EndpointId, principal: PrincipalId) -> Result<(), EndpointError> {
        let body = BanChatMember {
            chat_id: endpoint.into_inner(),
            user_id: principal.into_inner(),
        };
        self.call::<_, bool>("banChatMember", &body).await?;
        tracing::debug!("Banned from endpoint");
        Ok(())
    }

    #[instrument(skip(self), fields(endpoint = %endpoint, principal = %principal))]
    async fn unban(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<(), EndpointError> {
        let body = UnbanChatMember {
            chat_id: endpoint.into_inner(),
            user_id: principal.into_inner(),
            only_if_banned: false,
        };
        self.call::<_, bool>("unbanChatMember", &body).await?;
        tracing::debug!("Unbanned from endpoint");
        Ok(())
    }

    #[instrument(skip(self), fields(endpoint = %endpoint))]
    async fn create_join_link(
        &self,
        endpoint: EndpointId,
        label: Option<&str>,
    ) -> Result<String, EndpointError> {
        let body = CreateChatInviteLink {
            chat_id: endpoint.into_inner(),
            creates_join_request: true,
            name: label,
        };
        let link: InviteLink = self.call("createChatInviteLink", &body).await?;
        tracing::info!("Created join-request link");
        Ok(link.invite_link)
    }

    #[instrument(skip(self), fields(endpoint = %endpoint, principal = %principal))]
    async fn is_present(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<bool, EndpointError> {
        let body = GetChatMember {
            chat_id: endpoint.into_inner(),
            user_id: principal.into_inner(),
        };
        let member: ChatMember = self.call("getChatMember", &body).await?;
        tracing::debug!(status = %member.status, "Fetched endpoint membership");
        Ok(member.is_present())
    }
}
