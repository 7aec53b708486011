//! Authentication module.
//!
//! Verifies credentials, issues opaque session tokens, and gates protected
//! routes on a live session.
//!
//! # Pre-conditions
//! - User records carry digests produced by [`PasswordHasher::hash`] with the
//!   same iteration count the gateway is configured with.
//!
//! # Post-conditions
//! - A successful login yields exactly one new session.
//!
//! # Invariants
//! - Digests and full session tokens never appear in responses or logs.

pub mod cookie;
pub mod extract;
pub mod gateway;
pub mod password;
pub mod session;

use serde::{Deserialize, Serialize};

pub use cookie::SessionCookie;
pub use extract::AuthenticatedUser;
pub use gateway::AuthGateway;
pub use password::{PasswordError, PasswordHasher};
pub use session::{InMemorySessionStore, Session, SessionStore, SessionStoreError};

/// The part of a user that may be shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
}
