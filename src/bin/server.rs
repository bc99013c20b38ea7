//! Site server binary.
//!
//! Starts the axum HTTP server behind the ThinkBright marketing site:
//! static pages at the root, the JSON API under `/api`.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 5000)
//! - `DATABASE_URL` — PostgreSQL connection string; in-memory storage when unset
//! - `CONTACT_WEBHOOK_URL` — Optional webhook receiving contact submissions
//! - `STATIC_DIR` — Directory of static assets (default: "public")
//! - `RUST_LOG` — Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! # or with postgres:
//! cargo run --bin server --features postgres
//! ```

use std::sync::Arc;

use anyhow::Context;

use thinkbright::config::ServerConfig;
use thinkbright::notify::ContactRelay;
use thinkbright::server::{app_router, AppState};
use thinkbright::storage::{MemStorage, Storage};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,thinkbright=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let bind_addr = config.bind_addr();

    let (storage, database) = init_storage(&config).await;
    let mut state = AppState::new(storage);
    state.database = database;
    if let Some(url) = &config.contact_webhook_url {
        tracing::info!("Contact relay enabled");
        state.relay = Some(ContactRelay::new(url.clone()));
    }

    let app = app_router(state, &config.static_dir);

    tracing::info!("thinkbright server starting on {}", bind_addr);
    tracing::info!("Database: {}", database);
    tracing::info!("Static dir: {}", config.static_dir);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /api/health             — liveness + database status");
    tracing::info!("  POST /api/contact            — contact form");
    tracing::info!("  GET  /api/portfolio          — portfolio items");
    tracing::info!("  GET  /api/testimonials       — testimonials");
    tracing::info!("  POST /api/chat               — chat message + bot reply");
    tracing::info!("  GET  /api/chat/{{session_id}} — chat transcript");
    tracing::info!("  POST /api/subscribe          — newsletter signup");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Pick the storage backend from the environment: PostgreSQL when
/// `DATABASE_URL` is set and the feature is compiled, in-memory otherwise.
/// Returns the backend plus what the health endpoint should report.
#[cfg(feature = "postgres")]
async fn init_storage(config: &ServerConfig) -> (Arc<dyn Storage>, &'static str) {
    use thinkbright::storage::PgStorage;

    if let Some(url) = &config.database_url {
        tracing::info!("Connecting to PostgreSQL...");
        match PgStorage::connect(url).await {
            Ok(store) => {
                if let Err(e) = store.migrate().await {
                    tracing::error!("Failed to run migrations: {}", e);
                } else {
                    tracing::info!("PostgreSQL migrations complete");
                }
                return (Arc::new(store), "connected");
            }
            Err(e) => {
                tracing::error!("Failed to connect to PostgreSQL: {}", e);
                tracing::warn!("Falling back to in-memory storage");
            }
        }
    }
    (Arc::new(MemStorage::new()), "not configured")
}

#[cfg(not(feature = "postgres"))]
async fn init_storage(config: &ServerConfig) -> (Arc<dyn Storage>, &'static str) {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but the postgres feature is not compiled in");
    }
    (Arc::new(MemStorage::new()), "not configured")
}
