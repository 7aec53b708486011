//! Logout always succeeds and always clears the cookie.

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_logout_without_cookie() {
    let app = TestApp::new();

    let response = app.logout(None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Logged out");
    let cookie = response.set_cookie().expect("clearing cookie");
    assert!(cookie.starts_with("session_id=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_with_unknown_token() {
    let app = TestApp::new();
    let response = app.logout(Some("feedface")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_twice() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");
    let token = app.login("alice", "S3cret!").await.session_token();

    assert_eq!(app.logout(Some(&token)).await.status, StatusCode::OK);
    assert_eq!(app.logout(Some(&token)).await.status, StatusCode::OK);
    assert!(app.sessions.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn test_logout_only_ends_own_session() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");
    let first = app.login("alice", "S3cret!").await.session_token();
    let second = app.login("alice", "S3cret!").await.session_token();

    app.logout(Some(&first)).await;

    assert_eq!(app.get("/api/user", Some(&first)).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/user", Some(&second)).await.status, StatusCode::OK);
}
