//! Session API endpoints shared across roles.
//!
//! - POST `/refresh` - Exchange a refresh token for a rotated pair

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::Deserialize;

use super::error::ApiError;
use crate::auth::{
    ACCESS_COOKIE_NAME, AuthBackend, AuthError, HasAuthBackend, REFRESH_COOKIE_NAME, get_cookie,
    session,
};
use crate::impl_has_auth_backend;

// A refresh request body is a handful of JSON fields at most.
const BODY_LIMIT: usize = 16 * 1024;

#[derive(Clone)]
pub struct SessionsState {
    pub backend: AuthBackend,
}

impl_has_auth_backend!(SessionsState);

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/refresh", post(refresh))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Exchange a refresh token for a rotated access/refresh pair.
///
/// The token is looked for in the cookie first, then a JSON body field,
/// then an `Authorization: Bearer` header. Any failure, including a missing
/// token, is a plain 401.
async fn refresh(
    State(state): State<SessionsState>,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, ApiError> {
    let (parts, body) = request.into_parts();

    let presented = match get_cookie(&parts.headers, REFRESH_COOKIE_NAME) {
        Some(token) => Some(token.to_string()),
        None => {
            // A malformed or empty body falls through to the header source
            let bytes = axum::body::to_bytes(body, BODY_LIMIT)
                .await
                .unwrap_or_default();
            serde_json::from_slice::<RefreshRequest>(&bytes)
                .ok()
                .and_then(|req| req.refresh_token)
                .filter(|token| !token.is_empty())
                .or_else(|| bearer_token(&parts.headers).map(str::to_string))
        }
    };
    let presented = presented.ok_or(AuthError::Unauthorized)?;

    let (role, pair) = session::refresh(state.db(), state.keys(), &presented).await?;

    let cookies = state.cookies();
    let access_cookie = cookies.set(
        ACCESS_COOKIE_NAME,
        &pair.access_token,
        state.keys().access_ttl_secs(),
    );
    let refresh_cookie = cookies.set(
        REFRESH_COOKIE_NAME,
        &pair.refresh_token,
        state.keys().refresh_ttl_secs(),
    );

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(serde_json::json!({
            "success": true,
            "message": "Session refreshed",
            "body": {
                "role": role,
                "accessToken": pair.access_token,
                "refreshToken": pair.refresh_token,
            },
        })),
    ))
}
