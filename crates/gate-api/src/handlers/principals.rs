//! Principal preference handlers

use axum::{
    extract::{Path, State},
    Json,
};
use gate_service::dto::{LocaleRequest, LocaleResponse};
use gate_service::services::MemberQueryService;

use crate::extractors::{ApiToken, PrincipalIdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Preferred locale used when rendering notifications
///
/// GET /principals/{principal_id}/locale
pub async fn get_locale(
    State(state): State<AppState>,
    _token: ApiToken,
    Path(path): Path<PrincipalIdPath>,
) -> ApiResult<Json<LocaleResponse>> {
    let principal_id = path.principal_id()?;
    let locale = MemberQueryService::new(state.service_context())
        .locale(principal_id)
        .await?;
    Ok(Json(LocaleResponse {
        principal_id,
        locale,
    }))
}

/// PUT /principals/{principal_id}/locale
pub async fn set_locale(
    State(state): State<AppState>,
    _token: ApiToken,
    Path(path): Path<PrincipalIdPath>,
    ValidatedJson(request): ValidatedJson<LocaleRequest>,
) -> ApiResult<Json<LocaleResponse>> {
    let principal_id = path.principal_id()?;
    let service = MemberQueryService::new(state.service_context());
    service.set_locale(principal_id, &request.locale).await?;
    Ok(Json(LocaleResponse {
        principal_id,
        locale: service.locale(principal_id).await?,
    }))
}
