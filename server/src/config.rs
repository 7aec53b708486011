//! Server configuration module.
//!
//! This module provides configuration loading for the newsroom server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `NEWSROOM_DATABASE_PATH`: SQLite database file (default: `./data/newsroom.db`)
//! - `NEWSROOM_LISTEN_PORT`: Port to listen on (default: `5000`)
//! - `NEWSROOM_SESSION_TTL_SECS`: Session lifetime and cookie max-age (default: `86400`)
//! - `NEWSROOM_COOKIE_SECURE`: Add the `Secure` cookie attribute (default: `false`)
//! - `NEWSROOM_PBKDF2_ITERATIONS`: Password key-derivation rounds (default: `100000`)
//! - `NEWSROOM_ADMIN_USERNAME` / `NEWSROOM_ADMIN_PASSWORD`: Optional bootstrap account
//!
//! # Invariants
//!
//! - `listen_port` is never zero
//! - `session_ttl` is never zero
//! - `pbkdf2_iterations` is at least [`ServerConfig::MIN_PBKDF2_ITERATIONS`]
//! - `bootstrap_admin` is either fully specified or absent

use std::path::PathBuf;
use std::time::Duration;

/// Credentials for an account created at startup when it does not exist yet.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration.
///
/// Contains all configuration parameters needed to run the newsroom server.
///
/// # Post-conditions
///
/// When constructed via `from_env()` or `from_lookup()`, all invariants
/// listed in the module documentation hold.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the SQLite database holding users and content.
    pub database_path: PathBuf,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// How long a session stays valid after login.
    /// Also used as the session cookie's `Max-Age`.
    pub session_ttl: Duration,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// PBKDF2 iteration count for password digests.
    pub pbkdf2_iterations: u32,
    /// Optional account created at startup.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const DATABASE_PATH_VAR: &str = "NEWSROOM_DATABASE_PATH";
const LISTEN_PORT_VAR: &str = "NEWSROOM_LISTEN_PORT";
const SESSION_TTL_VAR: &str = "NEWSROOM_SESSION_TTL_SECS";
const COOKIE_SECURE_VAR: &str = "NEWSROOM_COOKIE_SECURE";
const PBKDF2_ITERATIONS_VAR: &str = "NEWSROOM_PBKDF2_ITERATIONS";
const ADMIN_USERNAME_VAR: &str = "NEWSROOM_ADMIN_USERNAME";
const ADMIN_PASSWORD_VAR: &str = "NEWSROOM_ADMIN_PASSWORD";

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 5000;
    /// Default database file.
    pub const DEFAULT_DATABASE_PATH: &'static str = "./data/newsroom.db";
    /// Default session lifetime: 24 hours.
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
    /// Default PBKDF2 iteration count.
    pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
    /// Lowest accepted PBKDF2 iteration count.
    pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `lookup` returns the value of a variable, or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `NEWSROOM_LISTEN_PORT` is set but not a valid non-zero port
    /// - `NEWSROOM_SESSION_TTL_SECS` is set but not a positive integer
    /// - `NEWSROOM_COOKIE_SECURE` is set but not `true` or `false`
    /// - `NEWSROOM_PBKDF2_ITERATIONS` is set but below the minimum
    /// - only one of the bootstrap admin variables is set, or either is empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .map_or_else(|| PathBuf::from(Self::DEFAULT_DATABASE_PATH), PathBuf::from);
        let listen_port = Self::load_listen_port(&lookup)?;
        let session_ttl = Self::load_session_ttl(&lookup)?;
        let cookie_secure = Self::load_cookie_secure(&lookup)?;
        let pbkdf2_iterations = Self::load_pbkdf2_iterations(&lookup)?;
        let bootstrap_admin = Self::load_bootstrap_admin(&lookup)?;

        Ok(Self {
            database_path,
            listen_port,
            session_ttl,
            cookie_secure,
            pbkdf2_iterations,
            bootstrap_admin,
        })
    }

    /// Load the listen port.
    ///
    /// Returns the default if not set.
    fn load_listen_port<F>(lookup: &F) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(LISTEN_PORT_VAR) else {
            return Ok(Self::DEFAULT_PORT);
        };
        match value.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(ConfigError::InvalidValue {
                name: LISTEN_PORT_VAR.to_string(),
                message: format!("'{value}' is not a valid port number (must be 1-65535)"),
            }),
        }
    }

    fn load_session_ttl<F>(lookup: &F) -> Result<Duration, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(SESSION_TTL_VAR) else {
            return Ok(Duration::from_secs(Self::DEFAULT_SESSION_TTL_SECS));
        };
        match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidValue {
                name: SESSION_TTL_VAR.to_string(),
                message: format!("'{value}' is not a positive number of seconds"),
            }),
        }
    }

    fn load_cookie_secure<F>(lookup: &F) -> Result<bool, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(COOKIE_SECURE_VAR).as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(ConfigError::InvalidValue {
                name: COOKIE_SECURE_VAR.to_string(),
                message: format!("'{other}' must be 'true' or 'false'"),
            }),
        }
    }

    fn load_pbkdf2_iterations<F>(lookup: &F) -> Result<u32, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(PBKDF2_ITERATIONS_VAR) else {
            return Ok(Self::DEFAULT_PBKDF2_ITERATIONS);
        };
        match value.parse::<u32>() {
            Ok(rounds) if rounds >= Self::MIN_PBKDF2_ITERATIONS => Ok(rounds),
            _ => Err(ConfigError::InvalidValue {
                name: PBKDF2_ITERATIONS_VAR.to_string(),
                message: format!(
                    "'{value}' must be an integer of at least {}",
                    Self::MIN_PBKDF2_ITERATIONS
                ),
            }),
        }
    }

    /// Load the optional bootstrap account.
    ///
    /// Both variables must be set together; neither may be empty.
    fn load_bootstrap_admin<F>(lookup: &F) -> Result<Option<BootstrapAdmin>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (lookup(ADMIN_USERNAME_VAR), lookup(ADMIN_PASSWORD_VAR)) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(ADMIN_PASSWORD_VAR.to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(ADMIN_USERNAME_VAR.to_string())),
            (Some(username), Some(password)) => {
                if username.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        name: ADMIN_USERNAME_VAR.to_string(),
                        message: "must not be empty".to_string(),
                    });
                }
                if password.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        name: ADMIN_PASSWORD_VAR.to_string(),
                        message: "must not be empty".to_string(),
                    });
                }
                Ok(Some(BootstrapAdmin { username, password }))
            }
        }
    }
}
