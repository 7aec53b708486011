//! Failed logins must not reveal which factor was wrong.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_unknown_user_and_wrong_password_look_identical() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");

    let unknown = app.login("mallory", "S3cret!").await;
    let wrong = app.login("alice", "not-it").await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong.body);
    assert_eq!(unknown.json(), json!({ "error": "Invalid username or password" }));
    assert!(unknown.set_cookie().is_none());
    assert!(wrong.set_cookie().is_none());
    assert!(app.sessions.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn test_username_is_case_sensitive() {
    let app = TestApp::new();
    app.register("alice", "S3cret!");

    let response = app.login("Alice", "S3cret!").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_corrupt_stored_digest_is_a_normal_failure() {
    let app = TestApp::new();
    app.test_db
        .database
        .create_user("carol", "garbage-without-separator")
        .expect("create user");

    let response = app.login("carol", "anything").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json(), json!({ "error": "Invalid username or password" }));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new();

    for body in ["not json", r#"{"username":"alice"}"#, "{}"] {
        let response = app
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(response.json()["error"].is_string());
    }
}
