//! Authentication state traits and macro.

use std::sync::Arc;

use crate::auth::cookie::CookieAttributes;
use crate::db::Database;
use crate::jwt::JwtKeys;
use crate::password::PasswordHasher;

/// Trait for state types that provide the backends the auth extractors and
/// session flows need.
pub trait HasAuthBackend {
    fn db(&self) -> &Database;
    fn keys(&self) -> &JwtKeys;
    fn hasher(&self) -> &PasswordHasher;
    fn cookies(&self) -> &CookieAttributes;
}

/// Shared backend bundle used by every router state.
#[derive(Clone)]
pub struct AuthBackend {
    pub db: Database,
    pub keys: Arc<JwtKeys>,
    pub hasher: Arc<PasswordHasher>,
    pub cookies: CookieAttributes,
}

/// Implement `HasAuthBackend` for a state struct with a `backend: AuthBackend`
/// field.
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn db(&self) -> &$crate::db::Database {
                &self.backend.db
            }
            fn keys(&self) -> &$crate::jwt::JwtKeys {
                &self.backend.keys
            }
            fn hasher(&self) -> &$crate::password::PasswordHasher {
                &self.backend.hasher
            }
            fn cookies(&self) -> &$crate::auth::CookieAttributes {
                &self.backend.cookies
            }
        }
    };
}
