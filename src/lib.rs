pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use api::create_api_router;
use auth::{AuthBackend, CookieAttributes};
use db::Database;
use jwt::JwtKeys;
use password::PasswordHasher;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens, must differ from the access secret
    pub refresh_secret: Vec<u8>,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
    /// Password hashing time cost (iterations)
    pub hash_cost: u32,
    /// Attributes applied to every auth cookie set or cleared
    pub cookies: CookieAttributes,
}

/// Create the application router with the given configuration.
///
/// Panics on invalid hashing parameters; that is a startup configuration
/// error, not a runtime condition.
pub fn create_app(config: &ServerConfig) -> Router {
    let keys = Arc::new(JwtKeys::new(
        &config.access_secret,
        &config.refresh_secret,
        config.access_ttl_secs,
        config.refresh_ttl_secs,
    ));

    let hasher =
        Arc::new(PasswordHasher::new(config.hash_cost).expect("Invalid password hashing cost"));

    let backend = AuthBackend {
        db: config.db.clone(),
        keys,
        hasher,
        cookies: config.cookies.clone(),
    };

    Router::new().nest("/api", create_api_router(backend))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
