//! # Ignition Runtime
//!
//! The runnable runtime: built-in modules, the transport and dashboard
//! servers they bind, and the initializer that drives the bootstrap from
//! module assembly through shutdown-hook arming. The binary entry point is
//! `main.rs`; this library exposes the internals for integration tests.

pub mod init;
pub mod modules;
pub mod server;

pub use init::{Initializer, Runtime};
pub use modules::{
    BuiltinModulesBundle, ConfigModule, DashboardModule, EchoModule, MetricsModule, ServerModule,
    ECHO_MODULE_ID,
};
pub use server::{DashboardServer, TransportServer};
