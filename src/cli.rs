//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use tracing::{error, info};

use crate::ServerConfig;
use crate::auth::cookie::{CookieAttributes, SameSite};
use crate::db::Database;
use crate::jwt::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Lectern",
    about = "Learning platform backend with role-scoped token authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7291")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "lectern.db")]
    pub database: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECS", default_value_t = DEFAULT_ACCESS_TTL_SECS)]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECS", default_value_t = DEFAULT_REFRESH_TTL_SECS)]
    pub refresh_ttl_secs: u64,

    /// Password hashing time cost (iterations)
    #[arg(long, env = "HASH_COST", default_value = "3")]
    pub hash_cost: u32,

    /// Set the Secure flag on auth cookies (required behind HTTPS)
    #[arg(long, env = "COOKIE_SECURE")]
    pub cookie_secure: bool,

    /// SameSite policy for auth cookies
    #[arg(long, env = "COOKIE_SAME_SITE", value_enum, default_value = "lax")]
    pub cookie_same_site: SameSite,

    /// Domain attribute for auth cookies
    #[arg(long, env = "COOKIE_DOMAIN")]
    pub cookie_domain: Option<String>,

    /// Omit the HttpOnly flag so frontend scripts can read the cookies
    #[arg(long)]
    pub cookie_allow_script_access: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the access and refresh token secrets from the environment.
/// Returns None and logs an error if either secret cannot be loaded.
pub fn load_token_secrets() -> Option<(String, String)> {
    let access = load_secret("ACCESS_TOKEN_SECRET")?;
    let refresh = load_secret("REFRESH_TOKEN_SECRET")?;

    // Distinct secrets are what keep the two token kinds apart
    if access == refresh {
        error!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
        return None;
    }

    Some((access, refresh))
}

fn load_secret(var: &str) -> Option<String> {
    let Ok(secret) = std::env::var(var) else {
        error!("{} environment variable is required", var);
        return None;
    };

    // Clear the environment variable to prevent leaking
    // SAFETY: We're single-threaded at this point during startup,
    // and no other code is reading this environment variable.
    unsafe { std::env::remove_var(var) };

    if secret.len() < MIN_TOKEN_SECRET_LENGTH {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            var, MIN_TOKEN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    args: &Args,
    db: Database,
    access_secret: String,
    refresh_secret: String,
) -> ServerConfig {
    ServerConfig {
        db,
        access_secret: access_secret.into_bytes(),
        refresh_secret: refresh_secret.into_bytes(),
        access_ttl_secs: args.access_ttl_secs,
        refresh_ttl_secs: args.refresh_ttl_secs,
        hash_cost: args.hash_cost,
        cookies: CookieAttributes {
            http_only: !args.cookie_allow_script_access,
            secure: args.cookie_secure,
            same_site: args.cookie_same_site,
            domain: args.cookie_domain.clone(),
        },
    }
}
