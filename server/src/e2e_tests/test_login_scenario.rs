//! Login, identity, logout for a single user.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_alice_login_identity_logout() {
    let app = TestApp::new();
    let alice = app.register("alice", "S3cret!");

    let login = app.login("alice", "S3cret!").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.json(), json!({ "id": alice.id, "username": "alice" }));
    let token = login.session_token();
    assert_eq!(token.len(), 64);

    let me = app.get("/api/user", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json(), json!({ "id": alice.id, "username": "alice" }));

    let logout = app.logout(Some(&token)).await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app.get("/api/user", Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.json(), json!({ "error": "Authentication required" }));
}

#[tokio::test]
async fn test_login_cookie_attributes() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");

    let login = app.login("alice", "S3cret!").await;
    let cookie = login.set_cookie().expect("Set-Cookie present");
    assert!(cookie.starts_with("session_id="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Domain="));
}

#[tokio::test]
async fn test_login_response_never_contains_digest() {
    let app = TestApp::new();
    let alice = app.register("alice", "S3cret!");

    let login = app.login("alice", "S3cret!").await;
    let body = login.text();
    assert!(!body.contains(&alice.password_digest));
    assert!(!body.contains("password"));
}

#[tokio::test]
async fn test_sessions_are_independent_per_login() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");
    app.register("bob", "hunter22");

    let alice = app.login("alice", "S3cret!").await.session_token();
    let bob = app.login("bob", "hunter22").await.session_token();
    assert_ne!(alice, bob);

    assert_eq!(app.get("/api/user", Some(&alice)).await.json()["username"], "alice");
    assert_eq!(app.get("/api/user", Some(&bob)).await.json()["username"], "bob");
    assert_eq!(app.sessions.len().expect("len"), 2);
}
