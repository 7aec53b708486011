//! Errors at the HTTP boundary.
//!
//! Every failure inside the service ends up as one of these before it
//! reaches a client. Response bodies are fixed strings: stored digests,
//! SQL text, and internal error messages never leave the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::session::SessionStoreError;
use crate::database::DataAccessError;

/// Body text for failed logins, whatever the cause.
pub const AUTHENTICATION_FAILURE_MESSAGE: &str = "Invalid username or password";
/// Body text for requests without a live session.
pub const SESSION_REQUIRED_MESSAGE: &str = "Authentication required";
/// Body text for internal failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    /// Unknown username or wrong password. Deliberately indistinguishable.
    AuthenticationFailure,
    /// No cookie, or the cookie names no live session.
    SessionNotFound,
    /// The data-access layer or session store failed. The detail is logged,
    /// never sent.
    DataAccessFailure(String),
    /// The request itself could not be understood.
    BadRequest(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailure => write!(f, "authentication failed"),
            Self::SessionNotFound => write!(f, "session not found"),
            Self::DataAccessFailure(detail) => write!(f, "data access failure: {detail}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DataAccessError> for ApiError {
    fn from(e: DataAccessError) -> Self {
        Self::DataAccessFailure(e.to_string())
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(e: SessionStoreError) -> Self {
        Self::DataAccessFailure(e.to_string())
    }
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailure | Self::SessionNotFound => StatusCode::UNAUTHORIZED,
            Self::DataAccessFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::AuthenticationFailure => AUTHENTICATION_FAILURE_MESSAGE,
            Self::SessionNotFound => SESSION_REQUIRED_MESSAGE,
            Self::DataAccessFailure(detail) => {
                tracing::error!("request failed: {detail}");
                INTERNAL_ERROR_MESSAGE
            }
            Self::BadRequest(message) => message.as_str(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
