//! Cookie construction and parsing for the token transport.
//!
//! All Set-Cookie strings come from one configuration-driven builder.
//! Clearing reuses the exact attributes used when setting: browsers match
//! cookies on attributes, so a clear with different attributes silently
//! leaves the original cookie in place.

use axum::http::header;

/// Cookie name for the access token.
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// SameSite policy for auth cookies.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Transport attributes for both auth cookies, loaded once at startup.
/// Every set/clear call site goes through this struct; nothing is hardcoded.
#[derive(Debug, Clone)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub domain: Option<String>,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            domain: None,
        }
    }
}

impl CookieAttributes {
    /// Build a Set-Cookie header value carrying `value` for `max_age` seconds.
    pub fn set(&self, name: &str, value: &str, max_age_secs: u64) -> String {
        let mut cookie = format!("{}={}; Path=/; Max-Age={}", name, value, max_age_secs);
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site.as_str());
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie
    }

    /// Build a Set-Cookie header value that removes the cookie.
    /// Uses the same attributes as `set`, which is what makes the clear
    /// actually take effect.
    pub fn clear(&self, name: &str) -> String {
        self.set(name, "", 0)
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
