//! Session lifecycle orchestration: login, logout, refresh.
//!
//! One session per account: the stored refresh token is the session. Every
//! successful login or refresh overwrites it, which invalidates whatever
//! token was live before (last login wins - a deliberate product decision,
//! not a race to fix). The store write is always awaited before the caller
//! builds a response, so a client can never hold a refresh token the store
//! does not know about yet.

use crate::db::{Database, Principal, Role};
use crate::jwt::JwtKeys;
use crate::password::PasswordHasher;

use super::errors::AuthError;
use super::types::CurrentPrincipal;

/// The two tokens minted together on login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue an access/refresh pair and persist the refresh token on the
/// account record. The persistence is part of the contract, not a cache:
/// refresh validation later compares against exactly this stored value.
pub async fn issue_pair(
    db: &Database,
    keys: &JwtKeys,
    principal: &Principal,
) -> Result<TokenPair, AuthError> {
    let access_token = keys
        .issue_access_token(principal)
        .map_err(|e| AuthError::db("Failed to sign access token", e))?;
    let refresh_token = keys
        .issue_refresh_token(principal)
        .map_err(|e| AuthError::db("Failed to sign refresh token", e))?;

    db.principals(principal.role)
        .set_refresh_token(&principal.id, &refresh_token)
        .await
        .map_err(|e| AuthError::db("Failed to persist refresh token", e))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify credentials and open a session.
pub async fn login(
    db: &Database,
    keys: &JwtKeys,
    hasher: &PasswordHasher,
    role: Role,
    username: &str,
    password: &str,
) -> Result<(CurrentPrincipal, TokenPair), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let principal = db
        .principals(role)
        .get_by_username(username)
        .await
        .map_err(|e| AuthError::db("Failed to look up account", e))?
        .ok_or(AuthError::NotFound)?;

    if !hasher.verify(password, &principal.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let pair = issue_pair(db, keys, &principal).await?;

    Ok((CurrentPrincipal::from(principal), pair))
}

/// Close the session by clearing the stored refresh token.
/// Idempotent: logging out an already logged-out account succeeds.
pub async fn logout(db: &Database, role: Role, principal_id: &str) -> Result<(), AuthError> {
    db.principals(role)
        .clear_refresh_token(principal_id)
        .await
        .map_err(|e| AuthError::db("Failed to clear refresh token", e))
}

/// Exchange a refresh token for a fresh pair, rotating the stored token.
///
/// The presented token must equal the stored value exactly; a token that
/// still verifies but was superseded by a newer login or refresh is
/// rejected. Every failure on this path collapses to `Unauthorized` - the
/// client learns nothing about which step broke.
pub async fn refresh(
    db: &Database,
    keys: &JwtKeys,
    presented: &str,
) -> Result<(Role, TokenPair), AuthError> {
    let claims = keys
        .validate_refresh_token(presented)
        .map_err(|_| AuthError::Unauthorized)?;

    let principal = db
        .principals(claims.role)
        .get_by_id(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load account during refresh: {}", e);
            AuthError::Unauthorized
        })?
        .ok_or(AuthError::Unauthorized)?;

    // Equality against the stored value, not just signature validity.
    // This single check is what makes rotation revoke older tokens.
    if principal.refresh_token.as_deref() != Some(presented) {
        return Err(AuthError::Unauthorized);
    }

    let pair = issue_pair(db, keys, &principal)
        .await
        .map_err(|_| AuthError::Unauthorized)?;

    Ok((principal.role, pair))
}
