//! Notification webhook adapter.
//!
//! Implements [`gate_core::Notifier`] by handing each notification to an
//! external renderer over HTTP.

mod notifier;

pub use notifier::{NotificationEnvelope, WebhookNotifier};
