//! Authentication: cookie transport, token extraction, role gating and
//! session lifecycle.

pub mod cookie;
pub mod errors;
pub mod extractors;
pub mod session;
pub mod state;
pub mod types;

pub use cookie::{ACCESS_COOKIE_NAME, CookieAttributes, REFRESH_COOKIE_NAME, SameSite, get_cookie};
pub use errors::AuthError;
pub use extractors::{AdminOnly, Auth, InstructorOnly, RequireRole, RoleConstraint, StudentOnly};
pub use session::TokenPair;
pub use state::{AuthBackend, HasAuthBackend};
pub use types::{CurrentPrincipal, LoginPrincipal};
