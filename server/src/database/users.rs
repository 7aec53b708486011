//! User records.
//!
//! The auth gateway only ever reads users by name, through [`UserDirectory`].
//! Creating users is limited to the startup bootstrap account and tests.

use rusqlite::{OptionalExtension, params};

use super::{DataAccessError, Database};

/// A stored user, including the password digest.
///
/// Never serialized to clients; see `auth::PublicUser` for that.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    /// Case-sensitive, unique, immutable after creation.
    pub username: String,
    /// `<hash hex>.<salt hex>` as produced by `PasswordHasher::hash`.
    pub password_digest: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Lookup of user records by username.
///
/// Implementations block; call them from a blocking context.
pub trait UserDirectory: Send + Sync {
    /// Find the user with exactly this username.
    ///
    /// Returns `Ok(None)` when no such user exists.
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DataAccessError>;
}

/// [`UserDirectory`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct SqliteUserDirectory {
    database: Database,
}

impl SqliteUserDirectory {
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }
}

impl UserDirectory for SqliteUserDirectory {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DataAccessError> {
        self.database.find_user_by_username(username)
    }
}

impl Database {
    /// Find a user by exact (case-sensitive) username.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DataAccessError> {
        let conn = self.connection()?;
        let user = conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_digest: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a new user with an already-computed password digest.
    ///
    /// # Errors
    /// Returns an error if the username is taken or the insert fails.
    pub fn create_user(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<UserRecord, DataAccessError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password_digest],
        )?;
        Ok(UserRecord {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_digest: password_digest.to_string(),
        })
    }
}
