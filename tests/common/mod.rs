//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use tower::ServiceExt;

use lectern::{ServerConfig, auth::CookieAttributes, create_app, db::Database};

pub const TEST_ACCESS_SECRET: &str = "access-secret-for-testing-only!!";
pub const TEST_REFRESH_SECRET: &str = "refresh-secret-for-testing-only!";

/// Create a test app over an in-memory database and return (app, db).
pub async fn create_test_app() -> (Router, Database) {
    create_test_app_with_cookies(CookieAttributes::default()).await
}

/// Create a test app with specific cookie attributes.
pub async fn create_test_app_with_cookies(cookies: CookieAttributes) -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        access_secret: TEST_ACCESS_SECRET.into(),
        refresh_secret: TEST_REFRESH_SECRET.into(),
        access_ttl_secs: 3600,
        refresh_ttl_secs: 864000,
        // Minimal cost to keep tests fast
        hash_cost: 1,
        cookies,
    };
    (create_app(&config), db)
}

/// Send a JSON POST and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Send a request with no body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub fn register_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": "Alice",
        "lastName": "Doe",
        "username": username,
        "email": format!("{}@example.com", username),
        "phone": format!("555000{:04}", username.len()),
        "password": "P@ssw0rd1",
    })
}

/// Register an account under the given role prefix (e.g. "students").
pub async fn register(app: &Router, prefix: &str, username: &str) -> Response<Body> {
    post_json(
        app,
        &format!("/api/{}/register", prefix),
        &register_body(username),
        &[],
    )
    .await
}

/// Log in and return the response.
pub async fn login(app: &Router, prefix: &str, username: &str, password: &str) -> Response<Body> {
    post_json(
        app,
        &format!("/api/{}/login", prefix),
        &serde_json::json!({ "username": username, "password": password }),
        &[],
    )
    .await
}

/// Register, log in and return (access_token, refresh_token).
pub async fn register_and_login(app: &Router, prefix: &str, username: &str) -> (String, String) {
    let response = register(app, prefix, username).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let response = login(app, prefix, username, "P@ssw0rd1").await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let json = body_json(response).await;
    let tokens = &json["body"]["tokens"];
    (
        tokens["accessToken"].as_str().unwrap().to_string(),
        tokens["refreshToken"].as_str().unwrap().to_string(),
    )
}

/// Parse the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract Set-Cookie headers from response.
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Check if cookies contain a token being cleared (Max-Age=0).
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", cookie_name)) && c.contains("Max-Age=0"))
}

/// Check if cookies carry a non-empty value for the given name.
pub fn has_set_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", cookie_name)) && !c.contains("Max-Age=0"))
}

pub fn auth_cookies(access_token: &str, refresh_token: &str) -> String {
    format!(
        "access_token={}; refresh_token={}",
        access_token, refresh_token
    )
}

pub fn refresh_cookie_only(refresh_token: &str) -> String {
    format!("refresh_token={}", refresh_token)
}
