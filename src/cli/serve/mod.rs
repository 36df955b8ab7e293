//! Serve command - runs the HTTP server

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;
    let app = build_app(&config, create_router_with_state(state));

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Merge the Prometheus endpoint when metrics are enabled
fn build_app(config: &AppConfig, router: Router) -> Router {
    match init_metrics(&config.metrics) {
        Some(metrics) => router.merge(create_metrics_router(metrics, &config.metrics.path)),
        None => router,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;

        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");

        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }
}
