// Life of a request:
// 1. Login: look up the user by name, verify the password digest on the
//    blocking pool, create a session, answer with a `session_id` cookie.
// 2. Later requests: read the cookie, look the token up in the session
//    store, then (for protected routes) run the content query.
// 3. Logout: drop the session and clear the cookie.
//
// System components:
//  - Password hasher (PBKDF2 digests)
//  - Session store (in-memory, behind a trait)
//  - Auth gateway (login / logout / identity + route gate)
//  - Content queries (SQLite, parameter-bound)

pub mod app;
pub mod auth;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod time;

mod testing;
