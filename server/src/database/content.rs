//! Read-only content queries: articles, categories, and tags.
//!
//! Every list is returned in a stable order. Limits are bound as statement
//! parameters like every other value.

use rusqlite::{Row, params};
use serde::Serialize;

use super::{DataAccessError, Database};

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub featured: bool,
    pub view_count: i64,
    /// Seconds since Unix epoch.
    pub created_at: i64,
}

/// Fields needed to insert an article.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub featured: bool,
    pub view_count: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

const ARTICLE_COLUMNS: &str =
    "id, title, slug, summary, content, category_id, featured, view_count, created_at";

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        summary: row.get(3)?,
        content: row.get(4)?,
        category_id: row.get(5)?,
        featured: row.get(6)?,
        view_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl Database {
    /// Newest articles first.
    pub fn list_articles(&self, limit: u32) -> Result<Vec<Article>, DataAccessError> {
        self.query_articles(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id DESC LIMIT ?1"),
            limit,
        )
    }

    /// Newest featured articles first.
    pub fn list_featured_articles(&self, limit: u32) -> Result<Vec<Article>, DataAccessError> {
        self.query_articles(
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles WHERE featured = 1 \
                 ORDER BY id DESC LIMIT ?1"
            ),
            limit,
        )
    }

    /// Most viewed articles first; ties go to the newer article.
    pub fn list_popular_articles(&self, limit: u32) -> Result<Vec<Article>, DataAccessError> {
        self.query_articles(
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 ORDER BY view_count DESC, id DESC LIMIT ?1"
            ),
            limit,
        )
    }

    // `sql` is always one of the constant statements above; only `limit`
    // comes from the caller and it is bound, not formatted.
    fn query_articles(&self, sql: &str, limit: u32) -> Result<Vec<Article>, DataAccessError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let articles = stmt
            .query_map(params![limit], article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    /// All categories, alphabetically.
    pub fn list_categories(&self) -> Result<Vec<Category>, DataAccessError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT id, name, slug FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// All tags, alphabetically.
    pub fn list_tags(&self) -> Result<Vec<Tag>, DataAccessError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT id, name, slug FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn insert_category(&self, name: &str, slug: &str) -> Result<Category, DataAccessError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO categories (name, slug) VALUES (?1, ?2)",
            params![name, slug],
        )?;
        Ok(Category {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    pub fn insert_tag(&self, name: &str, slug: &str) -> Result<Tag, DataAccessError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO tags (name, slug) VALUES (?1, ?2)",
            params![name, slug],
        )?;
        Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    pub fn insert_article(&self, article: &NewArticle) -> Result<Article, DataAccessError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO articles \
             (title, slug, summary, content, category_id, featured, view_count, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                article.title,
                article.slug,
                article.summary,
                article.content,
                article.category_id,
                article.featured,
                article.view_count,
                article.created_at,
            ],
        )?;
        Ok(Article {
            id: conn.last_insert_rowid(),
            title: article.title.clone(),
            slug: article.slug.clone(),
            summary: article.summary.clone(),
            content: article.content.clone(),
            category_id: article.category_id,
            featured: article.featured,
            view_count: article.view_count,
            created_at: article.created_at,
        })
    }
}
