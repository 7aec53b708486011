//! Shared test fixtures.

#![cfg(test)]
#![allow(clippy::expect_used)]

use tempfile::TempDir;

use crate::database::{Database, NewArticle};

/// A database in its own temporary directory.
///
/// The directory (and the database file) is removed when this is dropped.
pub struct TestDatabase {
    pub database: Database,
    _dir: TempDir,
}

impl TestDatabase {
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let database =
            Database::open(&dir.path().join("newsroom.db")).expect("Failed to open test database");
        Self {
            database,
            _dir: dir,
        }
    }
}

/// An unfeatured, unviewed article with the given slug.
#[must_use]
pub fn new_article(slug: &str) -> NewArticle {
    NewArticle {
        title: format!("Title for {slug}"),
        slug: slug.to_string(),
        summary: format!("Summary for {slug}"),
        content: format!("Body for {slug}"),
        created_at: 1_700_000_000,
        ..NewArticle::default()
    }
}
