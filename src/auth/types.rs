//! Authenticated principal types carried through request handling.

use serde::Serialize;

use crate::db::{Principal, Role};

/// Sanitized projection of the acting account, populated by the auth
/// extractors. This is the only principal shape handlers see and the only
/// one serialized into responses; the password hash and refresh token never
/// appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPrincipal {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub avatar: String,
}

impl From<Principal> for CurrentPrincipal {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            role: p.role,
            first_name: p.first_name,
            last_name: p.last_name,
            username: p.username,
            email: p.email,
            phone: p.phone,
            avatar: p.avatar,
        }
    }
}

/// Narrower projection used in the login response only: the username is
/// withheld there in addition to the secret fields. The client just typed
/// it; echoing it back is not needed and `/me` serves it when asked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPrincipal {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: String,
}

impl From<CurrentPrincipal> for LoginPrincipal {
    fn from(p: CurrentPrincipal) -> Self {
        Self {
            id: p.id,
            role: p.role,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone: p.phone,
            avatar: p.avatar,
        }
    }
}
