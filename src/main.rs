//! SincroGoo Gate - admin server for the outbound API gate
//!
//! Runs the cache and rate limiter behind an HTTP surface for inspection,
//! with a background sweeper bounding memory.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sincro_gate::api::create_router;
use sincro_gate::{spawn_sweep_task, AppState, Config};

/// Main entry point for the gate server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Build the gate (cache + rate limiter)
/// 4. Start the background sweep task
/// 5. Serve the admin router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sincro_gate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SincroGoo gate");

    let config = Config::from_env();
    let state = AppState::from_config(&config).context("invalid gate configuration")?;
    info!(
        cache_ttl_ms = config.cache_ttl_ms,
        cache_max_entries = config.cache_max_entries,
        rate_window_ms = config.rate_window_ms,
        max_requests = config.max_requests_per_window,
        wait_policy = %config.wait_policy,
        port = config.server_port,
        "configuration loaded"
    );

    let sweeper = spawn_sweep_task(state.gate.clone(), config.cleanup_interval());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Admin API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweeper.
async fn shutdown_signal(sweeper: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper.abort();
    warn!("Sweep task aborted");
}
