//! Account API endpoints, mounted once per role.
//!
//! - POST `/register` - Create an account
//! - POST `/login` - Verify credentials, open a session, set token cookies
//! - POST `/logout` - Close the session and clear cookies
//! - PUT `/password` - Change the account password
//! - GET `/me` - Current account, sanitized
//! - GET `/verify` - Role-gated probe: 200 only for this router's role

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post, put},
};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use crate::auth::{
    ACCESS_COOKIE_NAME, AdminOnly, Auth, AuthBackend, AuthError, HasAuthBackend, InstructorOnly,
    LoginPrincipal, REFRESH_COOKIE_NAME, RequireRole, RoleConstraint, StudentOnly, session,
};
use crate::db::{NewPrincipal, Role};
use crate::impl_has_auth_backend;

#[derive(Clone)]
pub struct AccountsState {
    pub backend: AuthBackend,
    pub role: Role,
}

impl_has_auth_backend!(AccountsState);

pub fn router(state: AccountsState) -> Router {
    // The verify gate is fixed to the role this router serves
    let verify = match state.role {
        Role::Student => get(verify::<StudentOnly>),
        Role::Instructor => get(verify::<InstructorOnly>),
        Role::Admin => get(verify::<AdminOnly>),
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/password", put(change_password))
        .route("/me", get(me))
        .route("/verify", verify)
        .with_state(state)
}

// Request fields are optional so an absent field gets the same structured
// 400 as an empty one instead of a serde rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
}

/// Create an account in this router's role collection.
async fn register(
    State(state): State<AccountsState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let first_name = req.first_name.as_deref().unwrap_or("").trim();
    let last_name = req.last_name.as_deref().unwrap_or("").trim();
    let username = req.username.as_deref().unwrap_or("").trim();
    let email = req.email.as_deref().unwrap_or("").trim();
    let phone = req.phone.as_deref().unwrap_or("").trim();
    let password = req.password.as_deref().unwrap_or("");

    if first_name.is_empty()
        || last_name.is_empty()
        || username.is_empty()
        || email.is_empty()
        || phone.is_empty()
        || password.is_empty()
    {
        return Err(AuthError::MissingCredentials.into());
    }

    let store = state.db().principals(state.role);

    let exists = store
        .exists_by_identity(username, email, phone)
        .await
        .db_err("Failed to check existing accounts")?;
    if exists {
        return Err(ApiError::conflict("Account already exists"));
    }

    let password_hash = state
        .hasher()
        .hash(password)
        .map_err(|e| ApiError::db_error("Failed to hash password", e))?;

    // A concurrent registration can slip past the pre-check and land on the
    // UNIQUE constraint; that is still a conflict, not a server fault.
    let id = store
        .create(&NewPrincipal {
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
            password_hash,
        })
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Account already exists")
            }
            _ => ApiError::db_error("Failed to create account", e),
        })?;

    let principal = store
        .get_by_id(&id)
        .await
        .db_err("Failed to load created account")?
        .ok_or_else(|| ApiError::internal("Created account not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Account created",
            "body": crate::auth::CurrentPrincipal::from(principal),
        })),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// Verify credentials, open a session and hand both tokens to the client
/// as cookies and in the body.
async fn login(
    State(state): State<AccountsState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (principal, pair) = session::login(
        state.db(),
        state.keys(),
        state.hasher(),
        state.role,
        req.username.as_deref().unwrap_or("").trim(),
        req.password.as_deref().unwrap_or(""),
    )
    .await?;

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
            "message": "Logged in",
            "body": {
                "principal": LoginPrincipal::from(principal),
                "tokens": {
                    "accessToken": pair.access_token,
                    "refreshToken": pair.refresh_token,
                },
            },
        })),
    ))
}

/// Close the session. The stored refresh token is cleared before the
/// response is built, and both cookies are expired with the same
/// attributes they were set with.
async fn logout(
    State(state): State<AccountsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    session::logout(state.db(), principal.role, &principal.id).await?;

    let cookies = state.cookies();
    Ok((
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, cookies.clear(ACCESS_COOKIE_NAME)),
            (SET_COOKIE, cookies.clear(REFRESH_COOKIE_NAME)),
        ]),
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out",
        })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: Option<String>,
    new_password: Option<String>,
}

/// Change the password for the authenticated account. The stored hash is
/// only rewritten when a new plaintext is supplied and the current one
/// verifies.
async fn change_password(
    State(state): State<AccountsState>,
    Auth(current): Auth,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let current_password = req.current_password.as_deref().unwrap_or("");
    let new_password = req.new_password.as_deref().unwrap_or("");
    if current_password.is_empty() || new_password.is_empty() {
        return Err(AuthError::MissingCredentials.into());
    }

    let store = state.db().principals(current.role);
    let mut principal = store
        .get_by_id(&current.id)
        .await
        .db_err("Failed to load account")?
        .ok_or(AuthError::NotFound)?;

    if !state
        .hasher()
        .verify(current_password, &principal.password_hash)
    {
        return Err(AuthError::InvalidCredentials.into());
    }

    let changed = state
        .hasher()
        .apply_password_change(&mut principal, Some(new_password))
        .map_err(|e| ApiError::db_error("Failed to hash password", e))?;
    if changed {
        store
            .update_password_hash(&principal.id, &principal.password_hash)
            .await
            .db_err("Failed to store new password hash")?;
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Password changed",
        })),
    ))
}

/// Return the authenticated account, sanitized.
async fn me(Auth(principal): Auth) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "body": principal,
        })),
    )
}

/// Role-gated probe: succeeds only for tokens carrying this router's role.
async fn verify<C: RoleConstraint + 'static>(gate: RequireRole<C>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "body": gate.principal,
        })),
    )
}
