//! Axum extractors for authentication and role gating.
//!
//! `Auth` is the general gate: any valid access token whose account still
//! exists. `RequireRole<C>` narrows that to a single role; a valid token
//! with the wrong role is rejected with 403, which keeps "log in again"
//! and "you lack permission" distinguishable for clients.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::AuthError;
use super::state::HasAuthBackend;
use super::types::CurrentPrincipal;
use crate::db::Role;

/// Read the access token from the cookie or, failing that, from an
/// `Authorization: Bearer` header.
pub(super) fn read_access_token<'a>(parts: &'a Parts) -> Option<&'a str> {
    if let Some(token) = get_cookie(&parts.headers, ACCESS_COOKIE_NAME) {
        return Some(token);
    }
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Core verification shared by every gate: validate the access token and
/// re-resolve the account it names. A token for a deleted account fails
/// with NotFound even though the signature still verifies.
async fn authenticate<S>(parts: &Parts, state: &S) -> Result<CurrentPrincipal, AuthError>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = read_access_token(parts).ok_or(AuthError::Unauthorized)?;

    let claims = state
        .keys()
        .validate_access_token(token)
        .map_err(|_| AuthError::Unauthorized)?;

    let principal = state
        .db()
        .principals(claims.role)
        .get_by_id(&claims.sub)
        .await
        .map_err(|e| AuthError::db("Failed to load principal", e))?
        .ok_or(AuthError::NotFound)?;

    Ok(CurrentPrincipal::from(principal))
}

/// Extractor for endpoints that require any authenticated account.
pub struct Auth(pub CurrentPrincipal);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Auth)
    }
}

/// A role restriction checked after token verification.
pub trait RoleConstraint: Send + Sync {
    fn allows(role: Role) -> bool;
}

pub struct StudentOnly;
pub struct InstructorOnly;
pub struct AdminOnly;

impl RoleConstraint for StudentOnly {
    fn allows(role: Role) -> bool {
        role == Role::Student
    }
}

impl RoleConstraint for InstructorOnly {
    fn allows(role: Role) -> bool {
        role == Role::Instructor
    }
}

impl RoleConstraint for AdminOnly {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
}

/// Extractor for endpoints restricted to one role.
pub struct RequireRole<C: RoleConstraint> {
    pub principal: CurrentPrincipal,
    _constraint: PhantomData<C>,
}

impl<S, C> FromRequestParts<S> for RequireRole<C>
where
    S: HasAuthBackend + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = authenticate(parts, state).await?;

        if !C::allows(principal.role) {
            return Err(AuthError::Forbidden);
        }

        Ok(RequireRole {
            principal,
            _constraint: PhantomData,
        })
    }
}
