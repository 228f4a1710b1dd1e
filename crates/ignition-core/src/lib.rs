//! # Ignition Core
//!
//! Runtime bootstrap and lifecycle orchestration for a pluggable server
//! framework. This crate owns the only real sequencing and
//! failure-propagation guarantees in the system:
//!
//! - **Module catalogue**: a fixed static module set plus modules discovered
//!   from `modules.toml` manifests, assembled in a deterministic order.
//! - **Component graph**: an explicit capability registry built by running
//!   every module's `configure` in catalogue order; instances are extracted
//!   by capability role in binding order.
//! - **Lifecycle orchestration**: sequential, fail-fast service startup and
//!   a fire-at-most-once shutdown hook that stops every started service,
//!   best effort.
//! - **Bootstrap container**: an independent two-phase (initialize, run)
//!   bundle pipeline holding the process-wide metric registry and the module
//!   constructor registry.
//!
//! Startup is single-threaded and synchronous from the orchestrator's point
//! of view: no two services start concurrently, and no timeout is imposed on
//! any start or stop call.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod manifest;
pub mod module;
pub mod registry;
pub mod service;

pub use bootstrap::{Bootstrap, Bundle, Environment};
pub use config::{ConfigError, DashboardConfig, ModuleConfig, RuntimeConfig, ServerConfig};
pub use error::BootstrapError;
pub use graph::{
    Binding, CapabilityRole, ComponentGraph, GraphBuilder, NetworkHandler, TransportRegistrar,
};
pub use lifecycle::{Lifecycle, ServiceHandle, ShutdownHook, ShutdownSnapshot};
pub use manifest::{discover_manifests, load_dynamic_modules, MODULE_MANIFEST_NAME};
pub use module::{Module, ModuleDescriptor, ModuleOrigin, ModuleSet};
pub use registry::{ModuleConstructor, ModuleRegistry};
pub use service::{Service, ServiceError, ServiceState};
