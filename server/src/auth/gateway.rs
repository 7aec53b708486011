//! Login, logout, and identity.
//!
//! [`AuthGateway`] composes the user directory, the password hasher, and
//! the session store. The axum handlers at the bottom of this file adapt it
//! to HTTP.
//!
//! # Invariants
//! - A failed login looks the same to the caller whether the username was
//!   unknown or the password was wrong, and costs one key derivation either way.
//! - Key derivation runs on the blocking pool and never under the session lock.
//! - Logout succeeds whether or not the session existed.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;

use super::PublicUser;
use super::cookie;
use super::password::PasswordHasher;
use super::session::{SessionStore, token_prefix};
use crate::app::AppState;
use crate::database::{DataAccessError, UserDirectory, UserRecord};
use crate::error::ApiError;

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub user: PublicUser,
    /// Token for the new session.
    pub token: String,
}

/// Credential verification and session issuance.
pub struct AuthGateway {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
}

impl AuthGateway {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// The session store this gateway issues sessions into.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// - `ApiError::AuthenticationFailure` for an unknown user or wrong password.
    /// - `ApiError::DataAccessFailure` if the user lookup or session store fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, ApiError> {
        let users = Arc::clone(&self.users);
        let hasher = self.hasher;
        let lookup_name = username.to_string();
        let attempt = password.to_string();

        let verified = tokio::task::spawn_blocking(move || -> Result<Option<UserRecord>, DataAccessError> {
            let Some(record) = users.find_by_username(&lookup_name)? else {
                hasher.burn(&attempt);
                return Ok(None);
            };
            let valid = hasher.verify(&attempt, &record.password_digest);
            Ok(valid.then_some(record))
        })
        .await
        .map_err(DataAccessError::from)??;

        let Some(record) = verified else {
            tracing::info!(username, "login rejected");
            return Err(ApiError::AuthenticationFailure);
        };

        let token = self.sessions.create(record.id, &record.username)?;
        tracing::info!(
            user_id = record.id,
            username = %record.username,
            session = %token_prefix(&token),
            "login succeeded"
        );

        Ok(LoginSuccess {
            user: PublicUser {
                id: record.id,
                username: record.username,
            },
            token,
        })
    }

    /// End the session for `token`, if there is one.
    ///
    /// # Errors
    /// Returns `ApiError::DataAccessFailure` only if the store is unusable.
    pub fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        if let Some(token) = token {
            self.sessions.destroy(token)?;
            tracing::info!(session = %token_prefix(token), "logged out");
        }
        Ok(())
    }

    /// Resolve `token` to the user it was issued to.
    ///
    /// # Errors
    /// - `ApiError::SessionNotFound` if there is no token or no live session.
    /// - `ApiError::DataAccessFailure` if the store is unusable.
    pub fn identity(&self, token: Option<&str>) -> Result<PublicUser, ApiError> {
        let token = token.ok_or(ApiError::SessionNotFound)?;
        let session = self
            .sessions
            .lookup(token)?
            .ok_or(ApiError::SessionNotFound)?;
        Ok(PublicUser {
            id: session.user_id,
            username: session.username,
        })
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!("rejected login body: {e}");
        ApiError::BadRequest("Username and password are required".to_string())
    })?;

    let success = state.auth.login(&request.username, &request.password).await?;
    Ok((
        [(header::SET_COOKIE, state.cookie.issue(&success.token))],
        Json(success.user),
    ))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(cookie::session_token(&headers))?;
    Ok(([(header::SET_COOKIE, state.cookie.clear())], "Logged out"))
}

/// `GET /api/user`
pub async fn identity(user: super::AuthenticatedUser) -> Json<PublicUser> {
    Json(user.0)
}
