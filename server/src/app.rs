//! Router and shared request state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::{self, AuthGateway, PasswordHasher, SessionCookie};
use crate::config::BootstrapAdmin;
use crate::content;
use crate::database::{DataAccessError, Database};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Login, logout, and identity.
    pub auth: Arc<AuthGateway>,
    /// Content and user storage.
    pub database: Database,
    /// How the session cookie is written.
    pub cookie: SessionCookie,
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(auth::gateway::login))
        .route("/api/logout", post(auth::gateway::logout))
        .route("/api/user", get(auth::gateway::identity))
        .route("/api/articles", get(content::list_articles))
        .route("/api/articles/featured", get(content::list_featured_articles))
        .route("/api/articles/popular", get(content::list_popular_articles))
        .route("/api/categories", get(content::list_categories))
        .route("/api/tags", get(content::list_tags))
        .route("/api/admin/articles", get(content::list_admin_articles))
        .with_state(state)
}

/// Create the configured bootstrap account unless that username exists.
///
/// Returns `true` when a user was created.
///
/// # Errors
/// Returns an error if the lookup or insert fails.
pub fn ensure_bootstrap_admin(
    database: &Database,
    hasher: PasswordHasher,
    admin: &BootstrapAdmin,
) -> Result<bool, DataAccessError> {
    if database.find_user_by_username(&admin.username)?.is_some() {
        return Ok(false);
    }
    let digest = hasher.hash(&admin.password);
    let user = database.create_user(&admin.username, &digest)?;
    tracing::info!(user_id = user.id, username = %user.username, "created bootstrap account");
    Ok(true)
}
