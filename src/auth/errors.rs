//! Authentication and authorization error taxonomy.
//!
//! Every lower-layer failure is mapped to one of these before it reaches the
//! transport layer. Responses carry `{success: false, message}` and nothing
//! else; the distinction between expired, tampered and superseded tokens is
//! deliberately not surfaced.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Login input missing username or password (400)
    MissingCredentials,
    /// Password did not verify (401)
    InvalidCredentials,
    /// No account behind the presented identity (404)
    NotFound,
    /// Absent, invalid, expired or superseded token (401)
    Unauthorized,
    /// Valid token, wrong role (403)
    Forbidden,
    /// Store or crypto failure; details go to the log only (500)
    Internal,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "All fields are required",
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::NotFound => "Account not found",
            AuthError::Unauthorized => "Unauthorized request",
            AuthError::Forbidden => "Forbidden request",
            AuthError::Internal => "Internal server error",
        }
    }

    /// Log and collapse a store failure.
    pub fn db(context: &str, e: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, e);
        AuthError::Internal
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorBody {
                success: false,
                message: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        // Forbidden and Unauthorized must stay distinguishable
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }
}
