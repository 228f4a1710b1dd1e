//! # Dashboard Server
//!
//! A small axum server exposing `/metrics` (Prometheus text exposition of
//! the container's registry) and `/status` (host identity and uptime).

use std::time::Instant;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use ignition_core::config::DashboardConfig;
use ignition_core::service::{Service, ServiceError};

#[derive(Clone)]
struct DashboardState {
    registry: Registry,
    host_name: String,
    started_at: Instant,
}

/// HTTP dashboard over the container's metric registry.
pub struct DashboardServer {
    config: DashboardConfig,
    registry: Registry,
    host_name: String,
    shutdown_tx: watch::Sender<bool>,
}

impl DashboardServer {
    /// Create an unstarted dashboard over the given registry.
    #[must_use]
    pub fn new(config: DashboardConfig, registry: Registry, host_name: String) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            registry,
            host_name,
            shutdown_tx,
        }
    }
}

async fn metrics_handler(State(state): State<DashboardState>) -> Result<String, StatusCode> {
    ignition_telemetry::metrics::encode(&state.registry).map_err(|e| {
        error!(error = %e, "metrics encoding failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn status_handler(State(state): State<DashboardState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "host": state.host_name,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

#[async_trait]
impl Service for DashboardServer {
    fn name(&self) -> &str {
        "dashboard-server"
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            ServiceError::new(format!("failed to bind dashboard on {addr}: {e}"))
        })?;
        let local_addr = listener.local_addr().map_err(ServiceError::from)?;
        info!(addr = %local_addr, "dashboard listening");

        let state = DashboardState {
            registry: self.registry.clone(),
            host_name: self.host_name.clone(),
            started_at: Instant::now(),
        };
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/status", get(status_handler))
            .with_state(state);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.changed().await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "dashboard server terminated abnormally");
            }
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        let _ = self.shutdown_tx.send(true);
        info!("dashboard server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral_config() -> DashboardConfig {
        DashboardConfig {
            enabled: true,
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    #[tokio::test]
    async fn starts_and_stops_on_an_ephemeral_port() {
        let server = DashboardServer::new(
            ephemeral_config(),
            Registry::new(),
            "test-host".to_string(),
        );
        server.start().await.expect("bind succeeds");
        server.stop().await.expect("stop succeeds");
    }
}
