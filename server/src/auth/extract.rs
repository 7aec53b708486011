//! Protected-route gate.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{PublicUser, cookie};
use crate::app::AppState;
use crate::error::ApiError;

/// The user behind the request's session cookie.
///
/// Taking this as a handler argument makes the route protected: requests
/// without a live session are rejected with 401 before the handler body
/// (and any query it would run) executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub PublicUser);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie::session_token(&parts.headers);
        state.auth.identity(token).map(Self)
    }
}
