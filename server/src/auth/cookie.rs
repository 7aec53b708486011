//! The `session_id` cookie.
//!
//! The cookie is HTTP-only, host-scoped (no `Domain` attribute), and lives
//! as long as a session does.

use std::time::Duration;

use axum::http::{HeaderMap, header};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// How session cookies are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookie {
    /// `Max-Age` of a freshly issued cookie.
    pub max_age: Duration,
    /// Whether to add the `Secure` attribute.
    pub secure: bool,
}

impl SessionCookie {
    #[must_use]
    pub const fn new(max_age: Duration, secure: bool) -> Self {
        Self { max_age, secure }
    }

    /// `Set-Cookie` value that stores `token`.
    #[must_use]
    pub fn issue(&self, token: &str) -> String {
        self.render(token, self.max_age.as_secs())
    }

    /// `Set-Cookie` value that makes the browser drop the cookie.
    #[must_use]
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Read the session token from the request's `Cookie` headers.
///
/// A DQUOTE-wrapped value is unwrapped. Returns `None` when the cookie is
/// missing or empty.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(value)
        })
        .filter(|value| !value.is_empty())
}
