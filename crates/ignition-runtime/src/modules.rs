//! # Built-in Modules
//!
//! The fixed static module set, in program order: config, metrics,
//! dashboard, server. Plus the pluggable `ignition.echo` module registered
//! in the default constructor registry, which exercises the dynamic loading
//! path end to end.

use std::sync::Arc;

use prometheus::{IntGaugeVec, Opts};
use tracing::{debug, info};

use ignition_core::bootstrap::{Bootstrap, Bundle, Environment};
use ignition_core::error::BootstrapError;
use ignition_core::graph::{GraphBuilder, NetworkHandler};
use ignition_core::module::Module;
use ignition_core::service::Service;

use crate::init::host_name;
use crate::server::{DashboardServer, TransportServer};

/// Validates the effective runtime configuration before anything binds.
pub struct ConfigModule;

impl Module for ConfigModule {
    fn name(&self) -> &str {
        "config"
    }

    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
        let config = &builder.environment().config;
        config.validate()?;
        info!(
            server_port = config.server.port,
            dashboard_port = config.dashboard.port,
            search_paths = ?config.modules.search_paths,
            "effective configuration"
        );
        Ok(())
    }
}

/// Registers runtime identity metrics into the container's registry.
pub struct MetricsModule;

impl Module for MetricsModule {
    fn name(&self) -> &str {
        "metrics"
    }

    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
        let build_info = IntGaugeVec::new(
            Opts::new("ignition_build_info", "Build information for the running binary"),
            &["version", "host"],
        )?;
        builder
            .environment()
            .metrics
            .register(Box::new(build_info.clone()))?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION"), &host_name()])
            .set(1);
        Ok(())
    }
}

/// Binds the dashboard server as a lifecycle-managed service, when enabled.
pub struct DashboardModule;

impl Module for DashboardModule {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
        let env = builder.environment();
        if !env.config.dashboard.enabled {
            debug!("dashboard disabled by configuration");
            return Ok(());
        }
        let server = Arc::new(DashboardServer::new(
            env.config.dashboard.clone(),
            env.metrics.clone(),
            host_name(),
        ));
        builder.bind_lifecycle("dashboard-server", server);
        Ok(())
    }
}

/// Binds the transport server: a lifecycle-managed service that is also the
/// registration entry point for extracted network handlers.
pub struct ServerModule;

impl Module for ServerModule {
    fn name(&self) -> &str {
        "server"
    }

    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
        let server = Arc::new(TransportServer::new(
            builder.environment().config.server.clone(),
        ));
        builder.bind_lifecycle("transport-server", Arc::clone(&server) as Arc<dyn Service>);
        builder.set_transport(server)?;
        Ok(())
    }
}

/// Identifier the echo module is registered under.
pub const ECHO_MODULE_ID: &str = "ignition.echo";

struct EchoHandler;

impl NetworkHandler for EchoHandler {
    fn endpoint(&self) -> &str {
        "/echo"
    }
}

/// A pluggable module binding a single echo handler.
pub struct EchoModule;

impl Module for EchoModule {
    fn name(&self) -> &str {
        "echo"
    }

    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
        builder.bind_network(Arc::new(EchoHandler));
        Ok(())
    }
}

/// Bundle that registers the built-in pluggable modules with the container's
/// constructor registry during its initialize phase.
pub struct BuiltinModulesBundle;

impl Bundle for BuiltinModulesBundle {
    fn name(&self) -> &str {
        "builtin-modules"
    }

    fn initialize(&mut self, bootstrap: &mut Bootstrap) {
        bootstrap
            .module_registry_mut()
            .register(ECHO_MODULE_ID, || Box::new(EchoModule));
    }

    fn run(&mut self, _env: &Environment) -> Result<(), BootstrapError> {
        debug!("built-in pluggable modules registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignition_core::bootstrap::Environment;
    use ignition_core::config::RuntimeConfig;
    use ignition_core::module::ModuleSet;

    fn ephemeral_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.server.port = 0;
        config.dashboard.port = 0;
        config
    }

    fn static_set() -> ModuleSet {
        let mut set = ModuleSet::new();
        set.push_static(Box::new(ConfigModule));
        set.push_static(Box::new(MetricsModule));
        set.push_static(Box::new(DashboardModule));
        set.push_static(Box::new(ServerModule));
        set
    }

    #[test]
    fn static_set_resolves_with_expected_bindings() {
        let env = Environment::new(ephemeral_config(), prometheus::Registry::new());
        let graph = static_set().resolve(env).expect("resolves");

        let services: Vec<_> = graph
            .lifecycle_services()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(services, vec!["dashboard-server", "transport-server"]);
        assert!(graph.transport().is_some());
        assert!(graph.network_handlers().is_empty());
    }

    #[test]
    fn disabled_dashboard_is_not_bound() {
        let mut config = ephemeral_config();
        config.dashboard.enabled = false;
        let env = Environment::new(config, prometheus::Registry::new());
        let graph = static_set().resolve(env).expect("resolves");

        let services: Vec<_> = graph
            .lifecycle_services()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(services, vec!["transport-server"]);
    }

    #[test]
    fn echo_module_binds_one_network_handler() {
        let env = Environment::new(ephemeral_config(), prometheus::Registry::new());
        let mut set = ModuleSet::new();
        set.push_dynamic(ECHO_MODULE_ID, Box::new(EchoModule));
        let graph = set.resolve(env).expect("resolves");

        let handlers = graph.network_handlers();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].endpoint(), "/echo");
    }

    #[test]
    fn config_module_rejects_port_collision() {
        let mut config = RuntimeConfig::default();
        config.dashboard.port = config.server.port;
        let env = Environment::new(config, prometheus::Registry::new());

        let mut set = ModuleSet::new();
        set.push_static(Box::new(ConfigModule));
        assert!(set.resolve(env).is_err());
    }
}
