//! Admin role handlers

use axum::{
    extract::{Path, State},
    Json,
};
use gate_service::dto::{AddAdminRequest, AdminResponse};
use gate_service::services::AdminService;

use crate::extractors::{Actor, ApiToken, OptionalValidatedJson, PrincipalIdPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// List admins, root first
///
/// GET /admins
pub async fn list_admins(
    State(state): State<AppState>,
    _token: ApiToken,
) -> ApiResult<Json<Vec<AdminResponse>>> {
    let ctx = state.service_context();
    let root = ctx.root_admin();
    let admins = AdminService::new(ctx).list().await?;
    Ok(Json(
        admins
            .into_iter()
            .map(|admin| AdminResponse::from_admin(admin, root))
            .collect(),
    ))
}

/// Grant or update the admin role
///
/// PUT /admins/{principal_id}
pub async fn put_admin(
    State(state): State<AppState>,
    actor: Actor,
    Path(path): Path<PrincipalIdPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<AddAdminRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let target = path.principal_id()?;
    let request = request.unwrap_or_default();

    let ctx = state.service_context();
    let admin = AdminService::new(ctx)
        .add(actor.principal_id, target, request.is_top_level)
        .await?;
    Ok(Json(AdminResponse::from_admin(admin, ctx.root_admin())))
}

/// Revoke the admin role
///
/// DELETE /admins/{principal_id}
pub async fn delete_admin(
    State(state): State<AppState>,
    actor: Actor,
    Path(path): Path<PrincipalIdPath>,
) -> ApiResult<NoContent> {
    let target = path.principal_id()?;
    AdminService::new(state.service_context())
        .remove(actor.principal_id, target)
        .await?;
    Ok(NoContent)
}
