//! Video Registry Main Entry Point
//!
//! Runs the discovery loop in the background and serves the read API until
//! ctrl-c.

use dotenv::dotenv;
use std::env;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use video_registry::{api, Dependencies, RegistryError};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("video_registry=info,video_registry_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "video-registry",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "video-registry",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<(), RegistryError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting video registry");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let discovery_handle = tokio::spawn(deps.discovery.run(shutdown_rx));

    let listener = TcpListener::bind(deps.bind_addr)
        .await
        .map_err(|e| RegistryError::server(format!("Failed to bind {}: {}", deps.bind_addr, e)))?;
    info!(addr = %deps.bind_addr, "Read API listening");

    let served = axum::serve(listener, api::router(deps.service))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Let the loop finish its current cycle
    let _ = shutdown_tx.send(());
    let _ = discovery_handle.await;

    match served {
        Ok(()) => {
            info!("Video registry stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Read API failed");
            Err(RegistryError::server(e.to_string()))
        }
    }
}
