//! # gate-api
//!
//! Admin HTTP surface built with Axum, plus the wiring that opens the store,
//! builds the platform adapters and runs the background loops.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_state_with, run, spawn_background};
pub use state::AppState;
