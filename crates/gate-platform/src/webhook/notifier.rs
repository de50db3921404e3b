//! Webhook notifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gate_core::{DeliveryError, NotificationKind, NotificationPayload, Notifier, PrincipalId};

use crate::http::PlatformError;

/// Body posted to the renderer for each notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub principal_id: PrincipalId,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

/// Delivers notifications by POSTing a [`NotificationEnvelope`]
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Create a notifier from gate-common config
    pub fn from_config(http: reqwest::Client, config: &gate_common::PlatformConfig) -> Self {
        Self::new(http, config.notify_webhook_url.clone())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, payload), fields(principal = %principal, kind = %kind))]
    async fn deliver(
        &self,
        principal: PrincipalId,
        kind: NotificationKind,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        let envelope = NotificationEnvelope {
            principal_id: principal,
            kind,
            payload: payload.clone(),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(PlatformError::from)?;

        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.unwrap_or_default();
            return Err(PlatformError::Rejected {
                method: "deliver",
                status: status.as_u16(),
                description,
            }
            .into());
        }

        tracing::debug!("Notification delivered");
        Ok(())
    }
}
