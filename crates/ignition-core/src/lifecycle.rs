//! # Lifecycle Orchestrator
//!
//! Owns every extracted lifecycle-managed service from extraction until
//! process termination. Startup is sequential in extraction order and
//! fail-fast: the first start failure aborts the bootstrap, leaving earlier
//! services running and later ones unattempted (no rollback). Shutdown works
//! from a snapshot of the services that actually reached `Started`, stopping
//! each exactly once, best effort.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::BootstrapError;
use crate::service::{Service, ServiceState};

/// A lifecycle-managed service together with its tracked state.
///
/// The state cell is shared with the shutdown snapshot so the hook can
/// record the `Started -> Stopped` transition it performs.
pub struct ServiceHandle {
    name: String,
    service: Arc<dyn Service>,
    state: Arc<Mutex<ServiceState>>,
}

impl ServiceHandle {
    /// Binding name of the service.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }
}

/// The lifecycle orchestrator: starts extracted services and produces the
/// shutdown snapshot.
pub struct Lifecycle {
    handles: Vec<ServiceHandle>,
}

impl Lifecycle {
    /// Take ownership of the extracted services, in extraction order.
    #[must_use]
    pub fn new(services: Vec<(String, Arc<dyn Service>)>) -> Self {
        let handles = services
            .into_iter()
            .map(|(name, service)| ServiceHandle {
                name,
                service,
                state: Arc::new(Mutex::new(ServiceState::Created)),
            })
            .collect();
        Self { handles }
    }

    /// Start every service sequentially, in extraction order.
    ///
    /// Fail-fast without rollback: on the first failure the failing handle
    /// is marked `Failed`, handles not yet reached stay `Created`, handles
    /// already `Started` are left running, and the error propagates as fatal.
    pub async fn start_all(&mut self) -> Result<(), BootstrapError> {
        for handle in &mut self.handles {
            info!(service = %handle.name, "starting service");
            match handle.service.start().await {
                Ok(()) => {
                    *handle.state.lock() = ServiceState::Started;
                }
                Err(source) => {
                    *handle.state.lock() = ServiceState::Failed;
                    return Err(BootstrapError::ServiceStart {
                        service: handle.name.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Capture the shutdown snapshot: exactly the handles that reached
    /// `Started`, in forward start order. A service that failed to start is
    /// never targeted for stop.
    #[must_use]
    pub fn snapshot(&self) -> ShutdownSnapshot {
        let entries = self
            .handles
            .iter()
            .filter(|handle| handle.state() == ServiceState::Started)
            .map(|handle| SnapshotEntry {
                name: handle.name.clone(),
                service: Arc::clone(&handle.service),
                state: Arc::clone(&handle.state),
            })
            .collect();
        ShutdownSnapshot { entries }
    }

    /// All handles, in extraction order.
    #[must_use]
    pub fn handles(&self) -> &[ServiceHandle] {
        &self.handles
    }
}

struct SnapshotEntry {
    name: String,
    service: Arc<dyn Service>,
    state: Arc<Mutex<ServiceState>>,
}

/// The fixed list of successfully started services, captured once after
/// startup and consumed exactly once by the shutdown hook.
pub struct ShutdownSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl ShutdownSnapshot {
    /// Number of snapshotted services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshotted service names, in capture order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

/// The process-termination hook. Armed once with the snapshot; `fire`
/// consumes it at most once per process lifetime.
pub struct ShutdownHook {
    snapshot: Mutex<Option<ShutdownSnapshot>>,
}

impl ShutdownHook {
    /// Arm the hook with the captured snapshot.
    #[must_use]
    pub fn arm(snapshot: ShutdownSnapshot) -> Self {
        info!(services = snapshot.len(), "shutdown hook armed");
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    /// Whether the hook still holds an unconsumed snapshot.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.snapshot.lock().is_some()
    }

    /// Stop every snapshotted service in forward capture order, best effort.
    ///
    /// Each stop is attempted exactly once; a successful stop moves the
    /// handle to `Stopped`, a failure is logged and does not prevent the
    /// remaining stops. A second fire is a no-op. Returns the number of
    /// stop failures.
    pub async fn fire(&self) -> usize {
        let Some(snapshot) = self.snapshot.lock().take() else {
            return 0;
        };

        info!(services = snapshot.len(), "stopping services");
        let mut failures = 0;
        for entry in snapshot.entries {
            match entry.service.stop().await {
                Ok(()) => {
                    *entry.state.lock() = ServiceState::Stopped;
                    info!(service = %entry.name, "service stopped");
                }
                Err(err) => {
                    failures += 1;
                    warn!(service = %entry.name, error = %err, "service failed to stop");
                }
            }
        }
        failures
    }
}
