//! # Bootstrap Error Taxonomy
//!
//! Errors raised while assembling and starting the runtime. Discovery,
//! instantiation, and start errors are fatal: the caller aborts the bootstrap
//! and the process exits before any service becomes reachable. Stop failures
//! during shutdown are deliberately *not* represented here; they are caught
//! and logged by the shutdown hook and never interrupt the remaining stops.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::service::ServiceError;

/// Fatal errors raised during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A module manifest or search path could not be read.
    #[error("module manifest discovery failed at {path}")]
    ConfigDiscovery {
        /// Path of the unreadable file or directory.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered manifest is not valid TOML.
    #[error("failed to parse module manifest {path}")]
    ManifestParse {
        /// Path of the malformed manifest.
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A manifest names an identifier with no registered constructor.
    #[error("unknown module identifier '{identifier}' in {manifest}")]
    ModuleInstantiation {
        /// The unresolvable identifier.
        identifier: String,
        /// Manifest that named it.
        manifest: PathBuf,
    },

    /// A module failed while contributing bindings to the graph.
    #[error("module '{module}' failed to configure the component graph: {reason}")]
    ModuleConfigure {
        /// Name of the failing module.
        module: String,
        /// What went wrong.
        reason: String,
    },

    /// No module bound a transport registrar, so extracted network handlers
    /// have nowhere to go.
    #[error("no transport registrar was bound by any module")]
    TransportNotBound,

    /// Two modules both tried to claim the transport registrar slot.
    #[error("transport registrar bound more than once")]
    TransportAlreadyBound,

    /// A lifecycle-managed service failed to start. Startup halts here;
    /// already-started services are left running.
    #[error("service '{service}' failed to start")]
    ServiceStart {
        /// Name of the failing service.
        service: String,
        #[source]
        source: ServiceError,
    },

    /// The effective runtime configuration is unreadable or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collector could not be registered with the metric registry.
    #[error("metric registration failed")]
    Metrics(#[from] prometheus::Error),

    /// A bundle's run phase failed, aborting the remaining bundles.
    #[error("bundle '{bundle}' run phase failed: {reason}")]
    BundleRun {
        /// Name of the failing bundle.
        bundle: String,
        /// What went wrong.
        reason: String,
    },
}
