//! Application startup: tracing, metrics recorder, store, state and server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, LogFormat};
use crate::database;
use crate::router::build_router;
use crate::services::IdempotencyStore;

const DEFAULT_LOG_FILTER: &str = "trademart_api=debug,tower_http=info";
const IDEMPOTENCY_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(err) = result {
        eprintln!("tracing subscriber already installed: {}", err);
    }
}

/// Initialize the store, the metrics recorder and every service.
pub async fn initialize_app(config: Config) -> Result<AppState> {
    info!(
        environment = %config.environment,
        backend = ?config.storage_backend,
        "🚀 Starting TradeMart API"
    );

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");

    let store = database::build_store(&config).await?;
    info!(backend = store.backend(), "✅ Store ready");

    let state = AppState::new(config, store, metrics_handle);
    spawn_idempotency_sweeper(state.idempotency.clone());
    info!("✅ Services initialized");

    Ok(state)
}

fn spawn_idempotency_sweeper(store: IdempotencyStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(IDEMPOTENCY_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            store.purge_expired();
        }
    });
}

/// Bind, serve and wait for a shutdown signal
pub async fn run(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = initialize_app(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
