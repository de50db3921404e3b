//! Outbound ports to the chat platform

use async_trait::async_trait;

use crate::error::{DeliveryError, EndpointError};
use crate::events::{NotificationKind, NotificationPayload};
use crate::value_objects::{EndpointId, PrincipalId};

/// Operations on one access endpoint
#[async_trait]
pub trait EndpointClient: Send + Sync {
    async fn ban(&self, endpoint: EndpointId, principal: PrincipalId) -> Result<(), EndpointError>;

    async fn unban(&self, endpoint: EndpointId, principal: PrincipalId)
        -> Result<(), EndpointError>;

    /// Create a join-request invitation link, optionally labelled
    async fn create_join_link(
        &self,
        endpoint: EndpointId,
        label: Option<&str>,
    ) -> Result<String, EndpointError>;

    /// Whether `principal` is currently inside `endpoint`
    async fn is_present(
        &self,
        endpoint: EndpointId,
        principal: PrincipalId,
    ) -> Result<bool, EndpointError>;
}

/// Delivers semantic notifications to principals
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(
        &self,
        principal: PrincipalId,
        kind: NotificationKind,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError>;
}
