#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics on bad input.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use newsroom::app::{self, AppState};
use newsroom::auth::session::spawn_session_pruner;
use newsroom::auth::{AuthGateway, InMemorySessionStore, PasswordHasher, SessionCookie, SessionStore};
use newsroom::config::ServerConfig;
use newsroom::database::{Database, SqliteUserDirectory};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroom=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: database_path={}, listen_port={}, session_ttl={}s",
        config.database_path.display(),
        config.listen_port,
        config.session_ttl.as_secs()
    );

    if let Some(parent) = config.database_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("Failed to create data directory: {e}");
            std::process::exit(1);
        }
    }

    let database = match Database::open(&config.database_path) {
        Ok(database) => database,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    // Validated by ServerConfig, so this only fails on a zero count.
    let hasher = match PasswordHasher::new(config.pbkdf2_iterations) {
        Ok(hasher) => hasher,
        Err(e) => {
            tracing::error!("Invalid password hashing parameters: {e}");
            std::process::exit(1);
        }
    };

    if let Some(admin) = &config.bootstrap_admin {
        if let Err(e) = app::ensure_bootstrap_admin(&database, hasher, admin) {
            tracing::error!("Failed to create bootstrap account: {e}");
            std::process::exit(1);
        }
    }

    // Sessions live only in this process; a restart logs everyone out.
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(config.session_ttl));
    let _pruner = spawn_session_pruner(Arc::downgrade(&sessions));

    let users = Arc::new(SqliteUserDirectory::new(database.clone()));
    let auth = Arc::new(AuthGateway::new(users, Arc::clone(&sessions), hasher));
    let state = AppState {
        auth,
        database,
        cookie: SessionCookie::new(config.session_ttl, config.cookie_secure),
    };

    let app = app::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });

    match sessions.len().and_then(|open| sessions.clear().map(|()| open)) {
        Ok(open) => tracing::info!("shutdown complete, dropped {open} sessions"),
        Err(e) => tracing::warn!("failed to clear sessions on shutdown: {e}"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
