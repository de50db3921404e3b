//! Principal-facing handlers
//!
//! The front end forwards credential submissions and endpoint join requests
//! here; both only need the API token.

use axum::{extract::State, Json};
use gate_service::dto::{JoinDecisionResponse, JoinRequest, SubmissionRequest, SubmissionResponse};
use gate_service::services::SubmissionService;

use crate::extractors::{ApiToken, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Submit a membership id for a principal
///
/// POST /submissions
pub async fn submit(
    State(state): State<AppState>,
    _token: ApiToken,
    ValidatedJson(request): ValidatedJson<SubmissionRequest>,
) -> ApiResult<Json<SubmissionResponse>> {
    let ctx = state.service_context();
    let result = SubmissionService::new(ctx)
        .submit(request.profile(), &request.membership_id)
        .await?;
    Ok(Json(SubmissionResponse::from_result(result, ctx.now())))
}

/// Decide a join request seen at an endpoint
///
/// POST /join-requests
pub async fn evaluate_join_request(
    State(state): State<AppState>,
    _token: ApiToken,
    ValidatedJson(request): ValidatedJson<JoinRequest>,
) -> ApiResult<Json<JoinDecisionResponse>> {
    let approved = SubmissionService::new(state.service_context())
        .evaluate_join_request(request.principal_id)
        .await?;
    Ok(Json(JoinDecisionResponse {
        principal_id: request.principal_id,
        approved,
    }))
}
