//! Notification events handed to the external renderer

mod notification;

pub use notification::{NotificationKind, NotificationPayload};
