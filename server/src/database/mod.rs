//! SQLite persistence for users and content.
//!
//! All statements use positional parameter binding; no caller-supplied value
//! is ever interpolated into SQL text.
//!
//! # Thread Safety
//!
//! [`Database`] wraps an `r2d2` connection pool and is cheap to clone. Every
//! operation borrows one pooled connection for its duration, so unrelated
//! requests do not serialize on a single connection. Calls block; async
//! callers should go through [`Database::run`].

pub mod content;
pub mod users;

mod schema;

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

pub use content::{Article, Category, NewArticle, Tag};
pub use users::{SqliteUserDirectory, UserDirectory, UserRecord};

/// Maximum number of pooled connections.
const MAX_POOL_SIZE: u32 = 8;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error returned when the data-access layer fails.
///
/// The detail is for logs only; HTTP callers see a generic server error.
#[derive(Debug)]
pub enum DataAccessError {
    /// No pooled connection could be obtained.
    Pool(r2d2::Error),
    /// A statement failed.
    Sqlite(rusqlite::Error),
    /// The blocking task running the query panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl std::fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "connection pool error: {e}"),
            Self::Sqlite(e) => write!(f, "sqlite error: {e}"),
            Self::Join(e) => write!(f, "query task failed: {e}"),
        }
    }
}

impl std::error::Error for DataAccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            Self::Sqlite(e) => Some(e),
            Self::Join(e) => Some(e),
        }
    }
}

impl From<r2d2::Error> for DataAccessError {
    fn from(e: r2d2::Error) -> Self {
        Self::Pool(e)
    }
}

impl From<rusqlite::Error> for DataAccessError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<tokio::task::JoinError> for DataAccessError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Join(e)
    }
}

/// Pooled handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    ///
    /// # Pre-conditions
    /// - The parent directory of `path` exists.
    ///
    /// # Post-conditions
    /// - All tables exist; existing data is untouched.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built or the schema fails to apply.
    pub fn open(path: &Path) -> Result<Self, DataAccessError> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            // Set first: the pool opens connections concurrently and the
            // WAL switch below takes a write lock.
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )
        });
        let pool = Pool::builder().max_size(MAX_POOL_SIZE).build(manager)?;

        let database = Self { pool };
        let conn = database.connection()?;
        schema::apply(&conn)?;
        drop(conn);
        Ok(database)
    }

    /// Borrow a pooled connection.
    ///
    /// # Errors
    /// Returns `DataAccessError::Pool` if no connection becomes available.
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, DataAccessError> {
        Ok(self.pool.get()?)
    }

    /// Run a blocking database operation on tokio's blocking pool.
    ///
    /// # Errors
    /// Returns whatever `operation` returns, or `DataAccessError::Join` if
    /// the blocking task panicked.
    pub async fn run<F, R>(&self, operation: F) -> Result<R, DataAccessError>
    where
        F: FnOnce(&Self) -> Result<R, DataAccessError> + Send + 'static,
        R: Send + 'static,
    {
        let database = self.clone();
        tokio::task::spawn_blocking(move || operation(&database)).await?
    }
}
