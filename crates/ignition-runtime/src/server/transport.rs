//! # Transport Server
//!
//! The network-facing service the initializer hands extracted handlers to.
//! The wire protocol is out of scope here: this server owns the listener,
//! the registration surface, and its own lifecycle; what flows over accepted
//! connections is the transport layer's concern.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use ignition_core::config::ServerConfig;
use ignition_core::graph::{NetworkHandler, TransportRegistrar};
use ignition_core::service::{Service, ServiceError};

/// TCP transport server with a registration entry point for network
/// handlers.
pub struct TransportServer {
    config: ServerConfig,
    handlers: RwLock<Vec<Arc<dyn NetworkHandler>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl TransportServer {
    /// Create an unstarted transport server.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            handlers: RwLock::new(Vec::new()),
            shutdown_tx,
        }
    }

    /// Endpoint names of the registered handlers, in registration order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|h| h.endpoint().to_string())
            .collect()
    }
}

impl TransportRegistrar for TransportServer {
    fn register_services(&self, handlers: Vec<Arc<dyn NetworkHandler>>) {
        for handler in &handlers {
            info!(endpoint = %handler.endpoint(), "registered network handler");
        }
        *self.handlers.write() = handlers;
    }
}

#[async_trait]
impl Service for TransportServer {
    fn name(&self) -> &str {
        "transport-server"
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            ServiceError::new(format!("failed to bind transport listener on {addr}: {e}"))
        })?;
        let local_addr = listener.local_addr().map_err(ServiceError::from)?;
        info!(
            addr = %local_addr,
            handlers = self.handlers.read().len(),
            "transport server listening"
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok((_stream, peer)) => debug!(%peer, "accepted connection"),
                        Err(e) => warn!(error = %e, "accept failed"),
                    },
                    _ = shutdown_rx.changed() => {
                        info!("transport accept loop stopped");
                        break;
                    }
                }
            }
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        // Receiver may already be gone if start never ran; that is fine.
        let _ = self.shutdown_tx.send(true);
        info!("transport server stopped");
        Ok(())
    }
}
