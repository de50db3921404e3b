//! Configuration read-outs for the front end

use axum::{extract::State, Json};
use gate_service::dto::GrantDurationResponse;

use crate::extractors::ApiToken;
use crate::state::AppState;

/// Approve durations offered to admins
///
/// GET /config/grant-durations
pub async fn grant_durations(
    State(state): State<AppState>,
    _token: ApiToken,
) -> Json<Vec<GrantDurationResponse>> {
    Json(
        state
            .service_context()
            .grant_durations()
            .iter()
            .copied()
            .map(GrantDurationResponse::from)
            .collect(),
    )
}
