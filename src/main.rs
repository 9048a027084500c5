//! IDaaS Server: identity and service-token authority
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use idaas_api::AppState;
use idaas_auth::jwt::Signer;
use idaas_auth::password::PasswordHasher;
use idaas_auth::token::TokenCleanup;
use idaas_core::config::{AppConfig, StoreBackend};
use idaas_core::error::AppError;
use idaas_database::{DatabasePool, MemoryStore, Stores};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "idaas-server", version, about = "IDaaS token and scope server")]
struct Args {
    /// Directory holding default.toml and the environment overlays.
    #[arg(long, env = "IDAAS_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Deployment environment; selects `<config-dir>/<env>.toml`.
    #[arg(long, env = "IDAAS_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config_dir, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        environment = %config.environment,
        "Starting IDaaS v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Signing keys ─────────────────────────────────────
    tracing::info!(
        algorithm = %config.jwt.algorithm,
        asymmetric = config.jwt.algorithm.is_asymmetric(),
        "Loading signing keys..."
    );
    let user_signer = Signer::from_config(config.jwt.algorithm, &config.jwt.user)?;
    let service_signer = Signer::from_config(config.jwt.algorithm, &config.jwt.service)?;

    // ── Step 2: Credential store ─────────────────────────────────
    let stores = match config.database.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            idaas_database::migration::run_migrations(db.pool()).await?;
            tracing::info!("Database migrations complete");

            Stores::postgres(db)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; credentials are lost on restart");
            Stores::memory(Arc::new(MemoryStore::new()))
        }
    };

    // ── Step 3: Services ─────────────────────────────────────────
    let addr = config.server.bind_address();
    let cleanup_interval = Duration::from_secs(config.tokens.cleanup_interval_seconds);
    let shutdown_grace = config.server.shutdown_grace();

    let (state, access_log_worker) = AppState::build(
        config,
        stores,
        user_signer,
        service_signer,
        PasswordHasher::new(),
    )?;

    // ── Step 4: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 5: Background tasks ─────────────────────────────────
    let access_log_handle = tokio::spawn(access_log_worker.run());
    tracing::info!("Access-log worker started");

    let cleanup = TokenCleanup::new(Arc::clone(&state.tokens), cleanup_interval);
    let cleanup_handle = tokio::spawn(async move { cleanup.run(shutdown_rx).await });
    tracing::info!(
        interval_secs = cleanup_interval.as_secs(),
        "Token cleanup started"
    );

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app = idaas_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("IDaaS server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 8: Wait for background tasks ────────────────────────
    // The router owned the last recorder handle, so the worker now drains
    // what is queued and exits.
    tracing::info!("Waiting for background tasks to complete...");

    if tokio::time::timeout(shutdown_grace, access_log_handle)
        .await
        .is_err()
    {
        tracing::warn!("Access-log worker did not drain in time");
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_handle).await;

    tracing::info!("IDaaS server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
