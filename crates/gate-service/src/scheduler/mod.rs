//! Background loops
//!
//! | Loop | Interval | Work |
//! |------|----------|------|
//! | [`ExpiryScheduler`] | `poll_interval_secs` | renewal warnings, grace notices, hard expiry |
//! | [`SessionSweeper`] | `min(session_timeout, 60s)` | resets idle sessions |
//!
//! Both stop when the shutdown watch flips to `true`, after finishing the
//! tick in progress.

mod expiry;
mod sweeper;

pub use expiry::{ExpiryScheduler, TickReport};
pub use sweeper::SessionSweeper;
