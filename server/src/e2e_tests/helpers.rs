//! Common helpers for end-to-end tests.

#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::app::{AppState, router};
use crate::auth::{AuthGateway, InMemorySessionStore, PasswordHasher, SessionCookie, SessionStore};
use crate::database::{SqliteUserDirectory, UserRecord};
use crate::testing::TestDatabase;

/// A response with its body fully read.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is UTF-8")
    }

    /// The `Set-Cookie` header, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().expect("ASCII cookie").to_string())
    }

    /// The session token carried by `Set-Cookie`.
    #[must_use]
    pub fn session_token(&self) -> String {
        let cookie = self.set_cookie().expect("Set-Cookie present");
        let pair = cookie.split(';').next().expect("name=value pair");
        pair.strip_prefix("session_id=")
            .expect("session_id cookie")
            .to_string()
    }
}

/// The full router over a fresh database and session store.
pub struct TestApp {
    pub router: Router,
    pub test_db: TestDatabase,
    pub sessions: Arc<dyn SessionStore>,
    pub hasher: PasswordHasher,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let test_db = TestDatabase::new();
        let hasher = PasswordHasher::new(1_000).expect("valid iteration count");
        let ttl = Duration::from_secs(24 * 60 * 60);
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(ttl));
        let users = Arc::new(SqliteUserDirectory::new(test_db.database.clone()));
        let state = AppState {
            auth: Arc::new(AuthGateway::new(users, Arc::clone(&sessions), hasher)),
            database: test_db.database.clone(),
            cookie: SessionCookie::new(ttl, false),
        };

        Self {
            router: router(state),
            test_db,
            sessions,
            hasher,
        }
    }

    /// Store a user with a properly hashed password.
    pub fn register(&self, username: &str, password: &str) -> UserRecord {
        self.test_db
            .database
            .create_user(username, &self.hasher.hash(password))
            .expect("create user")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session_id={token}"));
        }
        self.send(builder.body(Body::empty()).expect("request"))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn logout(&self, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("POST").uri("/api/logout");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session_id={token}"));
        }
        self.send(builder.body(Body::empty()).expect("request"))
            .await
    }
}
