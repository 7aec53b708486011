//! Content endpoints: articles, categories, and tags.
//!
//! All handlers are read-only. Queries run on the blocking pool; a failed
//! query becomes a generic 500.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::database::{Article, Category, Database, Tag};
use crate::error::ApiError;

/// Default page size for `GET /api/articles`.
pub const DEFAULT_ARTICLE_LIMIT: u32 = 20;
/// Default page size for `GET /api/articles/featured`.
pub const DEFAULT_FEATURED_LIMIT: u32 = 1;
/// Default page size for `GET /api/articles/popular`.
pub const DEFAULT_POPULAR_LIMIT: u32 = 5;
/// Larger requested limits are clamped to this.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u64>,
}

/// Resolve the effective limit from the query string.
///
/// # Errors
/// Returns `ApiError::BadRequest` when `limit` is not a non-negative integer.
fn resolve_limit(
    params: Result<Query<LimitParams>, QueryRejection>,
    default: u32,
) -> Result<u32, ApiError> {
    let Query(params) =
        params.map_err(|_| ApiError::BadRequest("limit must be a non-negative integer".to_string()))?;
    Ok(params.limit.map_or(default, |limit| {
        u32::try_from(limit.min(u64::from(MAX_LIMIT))).unwrap_or(MAX_LIMIT)
    }))
}

/// `GET /api/articles`
pub async fn list_articles(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = resolve_limit(params, DEFAULT_ARTICLE_LIMIT)?;
    let articles = state.database.run(move |db| db.list_articles(limit)).await?;
    Ok(Json(articles))
}

/// `GET /api/articles/featured`
pub async fn list_featured_articles(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = resolve_limit(params, DEFAULT_FEATURED_LIMIT)?;
    let articles = state
        .database
        .run(move |db| db.list_featured_articles(limit))
        .await?;
    Ok(Json(articles))
}

/// `GET /api/articles/popular`
pub async fn list_popular_articles(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = resolve_limit(params, DEFAULT_POPULAR_LIMIT)?;
    let articles = state
        .database
        .run(move |db| db.list_popular_articles(limit))
        .await?;
    Ok(Json(articles))
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.database.run(Database::list_categories).await?;
    Ok(Json(categories))
}

/// `GET /api/tags`
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.database.run(Database::list_tags).await?;
    Ok(Json(tags))
}

/// `GET /api/admin/articles`
///
/// Same listing as `/api/articles`, behind the session gate.
pub async fn list_admin_articles(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = resolve_limit(params, DEFAULT_ARTICLE_LIMIT)?;
    tracing::debug!(user_id = user.id, limit, "admin article listing");
    let articles = state.database.run(move |db| db.list_articles(limit)).await?;
    Ok(Json(articles))
}
