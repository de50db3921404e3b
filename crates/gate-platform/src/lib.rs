//! # gate-platform
//!
//! Outbound adapters to the chat platform.
//!
//! ## Features
//!
//! - **HTTP client**: shared `reqwest` client with timeouts
//! - **Bot API**: endpoint ban/unban and join-link creation ([`BotApiClient`])
//! - **Webhook**: notification delivery to the external renderer ([`WebhookNotifier`])
//!
//! ## Example
//!
//! ```ignore
//! use gate_platform::{BotApiClient, WebhookNotifier, HttpClientConfig};
//!
//! let http = HttpClientConfig::default().build()?;
//! let endpoints = BotApiClient::new(http.clone(), "https://api.telegram.org", bot_token);
//! let notifier = WebhookNotifier::new(http, webhook_url);
//!
//! endpoints.ban(endpoint_id, principal_id).await?;
//! notifier.deliver(principal_id, NotificationKind::Banned, &payload).await?;
//! ```

pub mod bot_api;
pub mod http;
pub mod webhook;

pub use bot_api::{BotApiClient, BotResponse, InviteLink};
pub use http::{HttpClientConfig, PlatformError, PlatformResult};
pub use webhook::{NotificationEnvelope, WebhookNotifier};
