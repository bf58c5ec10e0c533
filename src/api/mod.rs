mod accounts;
mod error;
mod sessions;

use axum::Router;

use crate::auth::AuthBackend;
use crate::db::Role;

pub use accounts::AccountsState;

/// Create the API router: one accounts router per role plus the shared
/// session endpoints.
pub fn create_api_router(backend: AuthBackend) -> Router {
    let students = accounts::AccountsState {
        backend: backend.clone(),
        role: Role::Student,
    };
    let instructors = accounts::AccountsState {
        backend: backend.clone(),
        role: Role::Instructor,
    };
    let admins = accounts::AccountsState {
        backend: backend.clone(),
        role: Role::Admin,
    };
    let sessions = sessions::SessionsState { backend };

    Router::new()
        .nest("/students", accounts::router(students))
        .nest("/instructors", accounts::router(instructors))
        .nest("/admins", accounts::router(admins))
        .nest("/sessions", sessions::router(sessions))
}
