//! Query failures surface as a generic 500.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_broken_table_yields_generic_error() {
    let app = TestApp::new();
    {
        let conn = app.test_db.database.connection().expect("connection");
        conn.execute_batch("DROP TABLE categories").expect("drop table");
    }

    let response = app.get("/api/categories", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "error": "Internal server error" }));
    assert!(!response.text().contains("categories"));
}

#[tokio::test]
async fn test_server_keeps_serving_after_failure() {
    let app = TestApp::new();
    {
        let conn = app.test_db.database.connection().expect("connection");
        conn.execute_batch("DROP TABLE tags").expect("drop table");
    }

    assert_eq!(
        app.get("/api/tags", None).await.status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(app.get("/api/articles", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_missing_users_table_is_generic_error() {
    let app = TestApp::new();
    {
        let conn = app.test_db.database.connection().expect("connection");
        conn.execute_batch("DROP TABLE users").expect("drop table");
    }

    let response = app.login("alice", "S3cret!").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "error": "Internal server error" }));
}
