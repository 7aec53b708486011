//! Session storage.
//!
//! Maps opaque session tokens to the user they were issued to. The
//! [`SessionStore`] trait is the seam the auth gateway depends on;
//! [`InMemorySessionStore`] is the default implementation.
//!
//! # In-memory store properties
//! - Starts empty when the process starts.
//! - Nothing is persisted: a restart logs every user out.
//! - Sessions older than the configured TTL are treated as absent and
//!   evicted on lookup or by [`spawn_session_pruner`].
//!
//! # Invariants
//! - A token identifies at most one live session.
//! - Tokens are 32 random bytes, hex-encoded, and never reissued while live.

use std::collections::HashMap;
use std::sync::{RwLock, Weak};
use std::time::Duration;

use rand::RngCore;

use crate::time::{SystemTimeSource, TimeSource};

/// Number of random bytes in a session token (hex-encoded to twice this).
pub const TOKEN_BYTES: usize = 32;

/// Longest interval between two pruning passes.
const MAX_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The opaque token handed to the client.
    pub token: String,
    /// Identifier of the user this session belongs to.
    pub user_id: i64,
    /// Username at login time.
    pub username: String,
    /// Creation time in milliseconds since Unix epoch.
    pub created_at_ms: u64,
}

/// Error returned when the session store cannot be accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The lock guarding the session map was poisoned by a panicking thread.
    LockPoisoned,
}

impl std::fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned => write!(f, "session store lock poisoned"),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Storage backend for sessions.
///
/// Implementations must be safe to call concurrently from many request
/// handlers. "Not found" is never an error: `lookup` returns `Ok(None)` and
/// `destroy` of an unknown token succeeds.
pub trait SessionStore: Send + Sync {
    /// Create a session for the given user and return its token.
    fn create(&self, user_id: i64, username: &str) -> Result<String, SessionStoreError>;

    /// Find the live session for `token`.
    fn lookup(&self, token: &str) -> Result<Option<Session>, SessionStoreError>;

    /// Remove the session for `token`, if any.
    fn destroy(&self, token: &str) -> Result<(), SessionStoreError>;

    /// Remove expired sessions. Returns how many were removed.
    fn prune_expired(&self) -> Result<usize, SessionStoreError>;

    /// Remove every session.
    fn clear(&self) -> Result<(), SessionStoreError>;

    /// Number of sessions currently held, expired or not.
    fn len(&self) -> Result<usize, SessionStoreError>;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> Result<bool, SessionStoreError> {
        Ok(self.len()? == 0)
    }

    /// How often expired sessions should be pruned.
    fn prune_interval(&self) -> Duration {
        MAX_PRUNE_INTERVAL
    }
}

/// Process-wide session map guarded by a single `RwLock`.
///
/// # Thread Safety
///
/// Lookups take the read lock; create, destroy, and pruning take the write
/// lock. No password hashing happens while either lock is held.
pub struct InMemorySessionStore<T: TimeSource = SystemTimeSource> {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    time: T,
}

impl InMemorySessionStore<SystemTimeSource> {
    /// Create an empty store using the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_time_source(ttl, SystemTimeSource)
    }
}

impl<T: TimeSource> InMemorySessionStore<T> {
    /// Create an empty store reading time from `time`.
    ///
    /// # Pre-conditions
    /// - `ttl` should be non-zero; a zero TTL expires sessions immediately.
    #[must_use]
    pub fn with_time_source(ttl: Duration, time: T) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            time,
        }
    }

    /// The configured session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[allow(clippy::cast_possible_truncation)] // TTLs beyond u64 milliseconds are not meaningful
    fn is_expired(&self, session: &Session, now_ms: u64) -> bool {
        now_ms.saturating_sub(session.created_at_ms) >= self.ttl.as_millis() as u64
    }
}

impl<T: TimeSource> SessionStore for InMemorySessionStore<T> {
    fn create(&self, user_id: i64, username: &str) -> Result<String, SessionStoreError> {
        let created_at_ms = self.time.now_ms();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;

        // A live token is never handed out twice.
        let token = loop {
            let candidate = generate_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            tracing::warn!("session token collision, regenerating");
        };

        sessions.insert(
            token.clone(),
            Session {
                token: token.clone(),
                user_id,
                username: username.to_string(),
                created_at_ms,
            },
        );
        drop(sessions);

        Ok(token)
    }

    fn lookup(&self, token: &str) -> Result<Option<Session>, SessionStoreError> {
        let now_ms = self.time.now_ms();
        {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| SessionStoreError::LockPoisoned)?;
            match sessions.get(token) {
                None => return Ok(None),
                Some(session) if !self.is_expired(session, now_ms) => {
                    return Ok(Some(session.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock. Re-check, since another
        // request may have replaced or removed it in between.
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        if sessions
            .get(token)
            .is_some_and(|session| self.is_expired(session, now_ms))
        {
            sessions.remove(token);
            tracing::debug!(token = %token_prefix(token), "evicted expired session");
        }
        drop(sessions);
        Ok(None)
    }

    fn destroy(&self, token: &str) -> Result<(), SessionStoreError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?
            .remove(token);
        if removed.is_some() {
            tracing::debug!(token = %token_prefix(token), "session destroyed");
        }
        Ok(())
    }

    fn prune_expired(&self) -> Result<usize, SessionStoreError> {
        let now_ms = self.time.now_ms();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now_ms));
        let removed = before - sessions.len();
        drop(sessions);
        Ok(removed)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?
            .clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?
            .len())
    }

    fn prune_interval(&self) -> Duration {
        self.ttl.min(MAX_PRUNE_INTERVAL).max(Duration::from_secs(1))
    }
}

/// Generate a fresh hex-encoded session token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The first few characters of a token, safe to put in logs.
#[must_use]
pub fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Spawn a background task that periodically prunes expired sessions.
///
/// # Invariants
/// - Holds only a `Weak` reference, so it never keeps the store alive.
/// - Exits cleanly once the store is dropped or its lock is poisoned.
pub fn spawn_session_pruner(store: Weak<dyn SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval = match store.upgrade() {
            Some(store) => store.prune_interval(),
            None => return,
        };
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            match store.prune_expired() {
                Ok(0) => {}
                Ok(removed) => tracing::info!("pruned {removed} expired sessions"),
                Err(e) => {
                    tracing::error!("session pruning stopped: {e}");
                    break;
                }
            }
        }
    })
}
