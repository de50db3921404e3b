//! Integration test utilities for the gatekeeper API
//!
//! Spawns the full Axum application on an ephemeral port, backed by an
//! in-memory SQLite store and recording platform fakes.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
