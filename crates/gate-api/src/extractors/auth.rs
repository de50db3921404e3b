//! Authentication extractors
//!
//! Every `/api/v1` route is called by a trusted front end holding the shared
//! admin API token. Mutating routes also name the principal acting on the
//! front end's behalf, which the service layer checks against the admin role.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use gate_core::PrincipalId;

use crate::response::ApiError;
use crate::state::AppState;

/// Header naming the principal on whose behalf the call is made
pub const ACTOR_HEADER: &str = "x-principal-id";

/// Proof that the request carried the configured bearer token
#[derive(Debug, Clone, Copy)]
pub struct ApiToken;

#[async_trait]
impl<S> FromRequestParts<S> for ApiToken
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        let expected = app_state.api_token();
        if expected.is_empty() || bearer.token() != expected {
            tracing::warn!("Rejected request with invalid API token");
            return Err(ApiError::InvalidToken);
        }

        Ok(ApiToken)
    }
}

/// Authenticated caller plus the principal it acts for
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub principal_id: PrincipalId,
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        ApiToken::from_request_parts(parts, state).await?;
        let principal_id = actor_from_headers(&parts.headers)?;
        Ok(Actor { principal_id })
    }
}

fn actor_from_headers(headers: &HeaderMap) -> Result<PrincipalId, ApiError> {
    let raw = headers
        .get(ACTOR_HEADER)
        .ok_or(ApiError::MissingActor)?
        .to_str()
        .map_err(|e| ApiError::InvalidActor(e.to_string()))?;

    PrincipalId::parse(raw).map_err(|_| ApiError::InvalidActor(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_actor_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::MissingActor)
        ));

        headers.insert(ACTOR_HEADER, HeaderValue::from_static(" 1001 "));
        assert_eq!(actor_from_headers(&headers).unwrap(), PrincipalId::new(1001));

        headers.insert(ACTOR_HEADER, HeaderValue::from_static("alice"));
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::InvalidActor(_))
        ));
    }
}
