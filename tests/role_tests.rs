//! Tests for access-token gating and role authorization.

mod common;

use axum::http::StatusCode;
use common::*;
use lectern::db::Role;
use lectern::jwt::AccessClaims;

#[tokio::test]
async fn test_verify_accepts_matching_role() {
    let (app, _db) = create_test_app().await;
    let (access, _refresh) = register_and_login(&app, "admins", "root").await;

    let cookie = format!("access_token={}", access);
    let response = send(&app, "GET", "/api/admins/verify", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["body"]["role"], "admin");
}

#[tokio::test]
async fn test_verify_rejects_wrong_role_with_forbidden() {
    let (app, _db) = create_test_app().await;
    let (access, _refresh) = register_and_login(&app, "students", "alice").await;

    // A valid student token on the admin gate is 403, not 401
    let cookie = format!("access_token={}", access);
    let response = send(&app, "GET", "/api/admins/verify", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Forbidden request");

    let response = send(
        &app,
        "GET",
        "/api/instructors/verify",
        &[("cookie", &cookie)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The matching gate still accepts it
    let response = send(&app, "GET", "/api/students/verify", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verify_without_token_is_unauthorized() {
    let (app, _db) = create_test_app().await;

    let response = send(&app, "GET", "/api/admins/verify", &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        "GET",
        "/api/admins/verify",
        &[("cookie", "access_token=garbage")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_via_bearer_header() {
    let (app, _db) = create_test_app().await;
    let (access, _refresh) = register_and_login(&app, "students", "alice").await;

    let bearer = format!("Bearer {}", access);
    let response = send(
        &app,
        "GET",
        "/api/students/verify",
        &[("authorization", &bearer)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let (app, _db) = create_test_app().await;
    register_and_login(&app, "students", "alice").await;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = AccessClaims {
        sub: "some-id".into(),
        role: Role::Student,
        username: "alice".into(),
        email: "alice@example.com".into(),
        avatar: "avatar.webp".into(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_ACCESS_SECRET.as_bytes()),
    )
    .unwrap();

    let cookie = format!("access_token={}", token);
    let response = send(&app, "GET", "/api/students/verify", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_sanitized_principal() {
    let (app, _db) = create_test_app().await;
    let (access, _refresh) = register_and_login(&app, "instructors", "carol").await;

    let cookie = format!("access_token={}", access);
    let response = send(&app, "GET", "/api/instructors/me", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["body"]["username"], "carol");
    assert_eq!(json["body"]["role"], "instructor");
    assert_eq!(json["body"]["firstName"], "Alice");

    let text = json.to_string();
    assert!(!text.contains("password"));
    assert!(!text.contains("refresh"));
}

#[tokio::test]
async fn test_token_for_deleted_account_rejected() {
    let (app, db) = create_test_app().await;
    let (access, _refresh) = register_and_login(&app, "students", "alice").await;

    sqlx::query("DELETE FROM students WHERE username = ?")
        .bind("alice")
        .execute(db.pool())
        .await
        .unwrap();

    // The signature still verifies but the account is gone
    let cookie = format!("access_token={}", access);
    let response = send(&app, "GET", "/api/students/me", &[("cookie", &cookie)]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
