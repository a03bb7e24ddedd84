// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::latest_reading::LatestReadingStore;
use crate::application::polling_controller::PollingController;
use crate::application::proxy_service::ProxyService;
use crate::infrastructure::config::{load_monitor_config, MonitorConfig, ProxyMode};
use crate::infrastructure::sensor_client::SensorClient;
use crate::presentation::app_state::AppState;
use crate::presentation::router::create_router;
use crate::presentation::status_watch::log_changes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_monitor_config().context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the configured filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let (proxy, poll_source) = build_services(&config)?;

    let shutdown = CancellationToken::new();
    let (controller, dashboard) = PollingController::new(
        Arc::new(poll_source),
        config.poll_interval(),
        shutdown.child_token(),
    );

    tokio::spawn(log_changes(dashboard.updates()));
    let controller_handle = dashboard.clone();

    let state = Arc::new(AppState { proxy, dashboard });
    let router = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Starting sand-monitor service on {}", addr);

    let poller = tokio::spawn(controller.run());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    controller_handle.stop();
    poller.await.context("Polling controller panicked")?;

    Ok(())
}

/// The /api proxy and the sensor client the polling controller reads from.
/// The controller always talks to the sensor, never to our own proxy.
fn build_services(config: &MonitorConfig) -> anyhow::Result<(ProxyService, SensorClient)> {
    // Shared last-reading record behind /api
    let store = Arc::new(LatestReadingStore::new());
    let proxy = match config.proxy.mode {
        ProxyMode::Ingest => ProxyService::new(store),
        ProxyMode::Upstream => {
            let upstream = SensorClient::new(&config.upstream.url, config.upstream_timeout())
                .context("Invalid upstream sensor settings")?;
            tracing::info!("Proxying upstream sensor at {}", upstream.url());
            ProxyService::new(store).with_upstream(Arc::new(upstream))
        }
    };

    let poll_source = SensorClient::new(&config.poll_url(), config.poll_timeout())
        .context("Invalid polling settings")?;
    tracing::info!("Polling {}", poll_source.url());

    Ok((proxy, poll_source))
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
