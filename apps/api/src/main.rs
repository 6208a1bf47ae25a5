//! # Lu Estilo API
//!
//! REST server for the back-office.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  .env ─► ApiConfig::load ─► Database::new (+ migrations)               │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                        bootstrap::ensure_admin                          │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  Admin UI ───► HTTP (8000) ───► axum Router ───► SQLite                │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                           WhatsApp gateway                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use estilo_api::config::DEV_JWT_SECRET;
use estilo_api::services::bootstrap::ensure_admin;
use estilo_api::services::notification_service::notifier_from_config;
use estilo_api::{router, ApiConfig, AppState};
use estilo_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("Failed to load configuration")?;

    init_tracing();

    info!("Starting Lu Estilo API server...");
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    if config.jwt_secret == DEV_JWT_SECRET {
        warn!("Using the development JWT secret; set ESTILO_JWT_SECRET in production");
    }

    if let Some(parent) = Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("Failed to open database")?;
    info!("Database ready");

    ensure_admin(&db, &config).await?;

    let notifier = notifier_from_config(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.http_port).parse()?;
    let state = AppState::new(db.clone(), config, notifier);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: `info,estilo=debug,sqlx=warn,tower_http=info`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,estilo=debug,sqlx=warn,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
