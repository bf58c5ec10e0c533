//! JWT token issuance and validation.
//!
//! Dual-token system with two independent secrets:
//! - Access tokens: short-lived, carry denormalized display claims
//! - Refresh tokens: long-lived, id and role only, one live value per
//!   account (tracked on the principal record)
//!
//! A token signed with one secret never validates against the other, so the
//! secret chosen by the caller is what discriminates token kinds.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::{Principal, Role};

/// Claims embedded in access tokens. Display fields are denormalized so
/// request handling does not need a store lookup just to render identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (principal id)
    pub sub: String,
    /// Account role
    pub role: Role,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Avatar file name
    pub avatar: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims embedded in refresh tokens: just enough to re-resolve the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (principal id)
    pub sub: String,
    /// Account role
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Default access token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 60 * 60;

/// Default refresh token lifetime: 10 days.
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 10 * 24 * 60 * 60;

/// Signing and verification keys for both token kinds.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl JwtKeys {
    /// Create keys from the two secrets. The secrets must be distinct;
    /// enforcing that is the caller's startup validation.
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }

    /// Issue an access token for an account.
    pub fn issue_access_token(&self, principal: &Principal) -> Result<String, JwtError> {
        let now = unix_now()?;

        let claims = AccessClaims {
            sub: principal.id.clone(),
            role: principal.role,
            username: principal.username.clone(),
            email: principal.email.clone(),
            avatar: principal.avatar.clone(),
            iat: now,
            exp: now + self.access_ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(JwtError::Encoding)
    }

    /// Issue a refresh token for an account.
    pub fn issue_refresh_token(&self, principal: &Principal) -> Result<String, JwtError> {
        let now = unix_now()?;

        let claims = RefreshClaims {
            sub: principal.id.clone(),
            role: principal.role,
            iat: now,
            exp: now + self.refresh_ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(JwtError::Encoding)
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let claims: AccessClaims = decode(token, &self.access_decoding)?;
        if claims.sub.is_empty() {
            return Err(JwtError::MalformedClaims);
        }
        Ok(claims)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        let claims: RefreshClaims = decode(token, &self.refresh_decoding)?;
        if claims.sub.is_empty() {
            return Err(JwtError::MalformedClaims);
        }
        Ok(claims)
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
) -> Result<T, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<T>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(JwtError::Decoding)
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations. Callers collapse every
/// validation variant into a single unauthorized outcome; the distinction
/// exists only for logging.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, expired, wrong secret, ...)
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Signature-valid claims missing the id/role identity
    MalformedClaims,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::MalformedClaims => write!(f, "Token claims are missing id or role"),
        }
    }
}

impl std::error::Error for JwtError {}
