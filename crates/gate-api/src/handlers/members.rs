//! Member handlers
//!
//! Admin lookups, export and the membership transitions. Transitions name
//! the member by membership id and act on behalf of the `X-Principal-Id`
//! admin.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use gate_core::{render_csv, ExportScope, GrantDuration};
use gate_service::dto::{ConfirmRequest, ExportQuery, ExportResponse, MemberCard, TransitionResponse};
use gate_service::services::{MemberQueryService, MembershipService, TransitionOutcome};

use crate::extractors::{Actor, ApiToken, ValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

fn respond(state: &AppState, outcome: TransitionOutcome) -> Json<TransitionResponse> {
    Json(TransitionResponse::from_outcome(
        outcome,
        state.service_context().now(),
    ))
}

/// Export members in a scope, as JSON or as a CSV attachment
///
/// GET /members/export?scope=all|active|expired|banned&format=json|csv
pub async fn export_members(
    State(state): State<AppState>,
    _token: ApiToken,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let scope = match query.scope.as_deref() {
        Some(raw) => ExportScope::parse(raw)?,
        None => ExportScope::All,
    };
    let csv = match query.format.as_deref().map(str::trim) {
        None | Some("json") => false,
        Some("csv") => true,
        Some(other) => {
            return Err(ApiError::invalid_query(format!(
                "unknown export format '{other}' (expected json or csv)"
            )))
        }
    };

    let rows = MemberQueryService::new(state.service_context())
        .export(scope)
        .await?;

    if !csv {
        return Ok(Json(ExportResponse::new(scope, rows)).into_response());
    }
    let disposition = format!("attachment; filename=\"members_{scope}.csv\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_csv(&rows),
    )
        .into_response())
}

/// Get a member by `@handle`, membership id or principal id, with endpoint
/// presence for bound records
///
/// GET /members/{key}
pub async fn get_member(
    State(state): State<AppState>,
    _token: ApiToken,
    Path(key): Path<String>,
) -> ApiResult<Json<MemberCard>> {
    let ctx = state.service_context();
    let queries = MemberQueryService::new(ctx);
    let member = queries.resolve(&key).await?;

    let presence = match member.principal_id {
        Some(principal) => Some(queries.presence(principal).await),
        None => None,
    };
    let card = MemberCard::from_member(member, ctx.now());
    Ok(Json(match presence {
        Some(present) => card.with_presence(present),
        None => card,
    }))
}

/// Confirm a member for `duration_secs` (`0` = unlimited)
///
/// POST /members/{membership_id}/confirm
pub async fn confirm_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ConfirmRequest>,
) -> ApiResult<Json<TransitionResponse>> {
    let duration = GrantDuration::from_secs(request.duration_secs)?;

    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service
        .confirm(actor.principal_id, &lookup, duration)
        .await?;
    Ok(respond(&state, outcome))
}

/// Decline a member
///
/// POST /members/{membership_id}/decline
pub async fn decline_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service.decline(actor.principal_id, &lookup).await?;
    Ok(respond(&state, outcome))
}

/// Ban a member at every endpoint
///
/// POST /members/{membership_id}/ban
pub async fn ban_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service.ban(actor.principal_id, &lookup).await?;
    Ok(respond(&state, outcome))
}

/// Lift a ban at every endpoint
///
/// POST /members/{membership_id}/unban
pub async fn unban_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service.unban(actor.principal_id, &lookup).await?;
    Ok(respond(&state, outcome))
}

/// Remove a member from every endpoint without a lasting ban
///
/// POST /members/{membership_id}/kick
pub async fn kick_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service.kick(actor.principal_id, &lookup).await?;
    Ok(respond(&state, outcome))
}

/// Kick a member, then delete the record and its principal
///
/// DELETE /members/{membership_id}
pub async fn remove_member(
    State(state): State<AppState>,
    actor: Actor,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<TransitionResponse>> {
    let service = MembershipService::new(state.service_context());
    let lookup = service.membership_lookup(&membership_id)?;
    let outcome = service.remove(actor.principal_id, &lookup).await?;
    Ok(respond(&state, outcome))
}
