//! # gate-service
//!
//! Application layer: the access enforcer, administrative transitions,
//! credential submission, join links, admin roles, session tracking and the
//! background expiry scheduler.

pub mod dto;
pub mod scheduler;
pub mod services;

pub use scheduler::{ExpiryScheduler, SessionSweeper, TickReport};
pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
