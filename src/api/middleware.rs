//! Authentication middleware for REST routes

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use crate::AppState;

/// Header carrying a bare access token
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Token from `x-access-token`, or from `Authorization: Bearer <token>`
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let direct = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    direct.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

/// Rejects the request with 401 unless it carries a valid access token.
/// On success the [`AuthUser`](crate::services::AuthUser) is stored in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Request without access token");
        return Err(ApiError::Unauthorized);
    };

    let user = state.auth.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
