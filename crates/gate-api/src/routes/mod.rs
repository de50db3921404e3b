//! Route definitions
//!
//! Health probes at the root, the admin API mounted under /api/v1.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admins, config, health, members, principals, submissions};
use crate::state::AppState;

/// Create the main router with health probes and all API routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes (no authentication)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(submission_routes())
        .merge(member_routes())
        .merge(admin_routes())
        .merge(principal_routes())
        .route("/config/grant-durations", get(config::grant_durations))
}

/// Principal-facing routes forwarded by the front end
fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/submissions", post(submissions::submit))
        .route("/join-requests", post(submissions::evaluate_join_request))
}

/// Member lookup, export and transitions
fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/members/export", get(members::export_members))
        .route(
            "/members/:membership_id",
            get(members::get_member).delete(members::remove_member),
        )
        .route("/members/:membership_id/confirm", post(members::confirm_member))
        .route("/members/:membership_id/decline", post(members::decline_member))
        .route("/members/:membership_id/ban", post(members::ban_member))
        .route("/members/:membership_id/unban", post(members::unban_member))
        .route("/members/:membership_id/kick", post(members::kick_member))
}

/// Admin role management
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admins", get(admins::list_admins))
        .route(
            "/admins/:principal_id",
            put(admins::put_admin).delete(admins::delete_admin),
        )
}

/// Principal preferences
fn principal_routes() -> Router<AppState> {
    Router::new().route(
        "/principals/:principal_id/locale",
        get(principals::get_locale).put(principals::set_locale),
    )
}
