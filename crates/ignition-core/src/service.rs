//! # Lifecycle-Managed Service Contract
//!
//! The capability implemented by every component the orchestrator owns:
//! `start` may fail (fatal to the bootstrap), `stop` may fail (tolerated and
//! logged by the shutdown hook).

use std::fmt;

use async_trait::async_trait;

/// States a managed service moves through.
///
/// Transitions: `Created -> Started` on a successful start,
/// `Created -> Failed` when start raises, `Started -> Stopped` when the
/// shutdown hook runs. `Started` and `Stopped` are each entered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Extracted from the graph, start not yet attempted.
    Created,
    /// Start completed successfully.
    Started,
    /// Stopped by the shutdown hook.
    Stopped,
    /// Start raised; no further services were attempted.
    Failed,
}

/// Error raised by a service's start or stop.
#[derive(Debug)]
pub struct ServiceError {
    message: String,
}

impl ServiceError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A component with an orchestrated lifecycle.
///
/// Start order is the graph binding order and is owned entirely by the
/// [`Lifecycle`](crate::lifecycle::Lifecycle) orchestrator; implementations
/// must not assume any other service is running unless it was bound earlier.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable name used in logs and error context.
    fn name(&self) -> &str;

    /// Start the service. A failure here is fatal to the whole bootstrap.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Stop the service. Failures are caught and logged by the shutdown
    /// hook; they never interrupt the remaining stops.
    async fn stop(&self) -> Result<(), ServiceError>;
}
