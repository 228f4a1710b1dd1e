//! # Bootstrap Container
//!
//! The pre-start container: process-wide shared state (the metric registry,
//! the module constructor registry) created once at construction and torn
//! down with the container, plus a two-phase bundle pipeline. Bundles
//! initialize synchronously when added and run in registration order; the
//! first run-phase failure aborts the rest with no rollback of earlier
//! bundles' effects.
//!
//! This pipeline is independent of the component graph and usable before or
//! alongside it.

use prometheus::Registry;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::error::BootstrapError;
use crate::registry::ModuleRegistry;

use ignition_telemetry::metrics::BootstrapMetrics;

/// Shared state handed to components and bundle run phases.
///
/// Created from the container's own state; `Registry` shares its collectors
/// across clones, so cloning an environment is cheap and keeps a single
/// metric registry per container.
#[derive(Clone)]
pub struct Environment {
    /// Effective runtime configuration.
    pub config: RuntimeConfig,
    /// The container's metric registry.
    pub metrics: Registry,
}

impl Environment {
    /// Create an environment over a configuration and metric registry.
    #[must_use]
    pub fn new(config: RuntimeConfig, metrics: Registry) -> Self {
        Self { config, metrics }
    }
}

/// An independent two-phase extension unit.
///
/// `initialize` runs synchronously while the bundle is added and must be
/// side-effect-light: no long-running work, no blocking I/O. `run` executes
/// later, in registration order.
pub trait Bundle: Send {
    /// Bundle name for logs and error context.
    fn name(&self) -> &str;

    /// First phase: register shared state with the container.
    fn initialize(&mut self, bootstrap: &mut Bootstrap);

    /// Second phase: run against the environment. The first failure aborts
    /// the remaining bundles.
    fn run(&mut self, env: &Environment) -> Result<(), BootstrapError>;
}

/// The pre-start application container.
pub struct Bootstrap {
    metrics: Registry,
    pipeline_metrics: BootstrapMetrics,
    module_registry: ModuleRegistry,
    bundles: Vec<Box<dyn Bundle>>,
}

impl Bootstrap {
    /// Create the container, its metric registry, and the bootstrap pipeline
    /// metrics registered into it.
    pub fn new() -> Result<Self, BootstrapError> {
        let metrics = Registry::new();
        let pipeline_metrics = BootstrapMetrics::register(&metrics)?;
        Ok(Self {
            metrics,
            pipeline_metrics,
            module_registry: ModuleRegistry::new(),
            bundles: Vec::new(),
        })
    }

    /// The container's metric registry.
    #[must_use]
    pub fn metric_registry(&self) -> &Registry {
        &self.metrics
    }

    /// Metrics covering the bootstrap pipeline itself.
    #[must_use]
    pub fn pipeline_metrics(&self) -> &BootstrapMetrics {
        &self.pipeline_metrics
    }

    /// The module constructor registry. Bundles and built-ins register
    /// pluggable modules here before dynamic loading runs.
    #[must_use]
    pub fn module_registry(&self) -> &ModuleRegistry {
        &self.module_registry
    }

    /// Mutable access to the module constructor registry.
    pub fn module_registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.module_registry
    }

    /// Add a bundle: invoke its initialize phase with this container, then
    /// append it. Registration order is fixed at append time.
    pub fn add_bundle(&mut self, mut bundle: Box<dyn Bundle>) {
        info!(bundle = %bundle.name(), "initializing bundle");
        bundle.initialize(self);
        self.bundles.push(bundle);
    }

    /// Run every bundle's run phase in registration order, fail-fast.
    pub fn run(&mut self, env: &Environment) -> Result<(), BootstrapError> {
        for bundle in &mut self.bundles {
            info!(bundle = %bundle.name(), "running bundle");
            bundle.run(env)?;
        }
        Ok(())
    }

    /// Build the shared environment over this container's registry.
    #[must_use]
    pub fn environment(&self, config: RuntimeConfig) -> Environment {
        Environment::new(config, self.metrics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::module::Module;
    use std::sync::{Arc, Mutex};

    struct StubModule;

    impl Module for StubModule {
        fn name(&self) -> &str {
            "stub"
        }
        fn configure(&self, _builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
            Ok(())
        }
    }

    struct RecordingBundle {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_run: bool,
    }

    impl Bundle for RecordingBundle {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, bootstrap: &mut Bootstrap) {
            // Bundles may register pluggable modules during initialize.
            bootstrap
                .module_registry_mut()
                .register(format!("{}.module", self.name), || Box::new(StubModule));
            self.log.lock().unwrap().push(format!("init:{}", self.name));
        }

        fn run(&mut self, _env: &Environment) -> Result<(), BootstrapError> {
            self.log.lock().unwrap().push(format!("run:{}", self.name));
            if self.fail_run {
                return Err(BootstrapError::BundleRun {
                    bundle: self.name.to_string(),
                    reason: "induced failure".to_string(),
                });
            }
            Ok(())
        }
    }

    fn bundle(
        name: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
        fail_run: bool,
    ) -> Box<dyn Bundle> {
        Box::new(RecordingBundle {
            name,
            log: Arc::clone(log),
            fail_run,
        })
    }

    #[test]
    fn initialize_runs_at_append_time_and_sees_the_container() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bootstrap = Bootstrap::new().unwrap();
        bootstrap.add_bundle(bundle("metrics", &log, false));

        assert_eq!(*log.lock().unwrap(), vec!["init:metrics"]);
        assert!(bootstrap.module_registry().contains("metrics.module"));
    }

    #[test]
    fn run_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bootstrap = Bootstrap::new().unwrap();
        bootstrap.add_bundle(bundle("one", &log, false));
        bootstrap.add_bundle(bundle("two", &log, false));

        let env = bootstrap.environment(RuntimeConfig::default());
        bootstrap.run(&env).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["init:one", "init:two", "run:one", "run:two"]
        );
    }

    #[test]
    fn run_aborts_after_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bootstrap = Bootstrap::new().unwrap();
        bootstrap.add_bundle(bundle("good", &log, false));
        bootstrap.add_bundle(bundle("bad", &log, true));
        bootstrap.add_bundle(bundle("never", &log, false));

        let env = bootstrap.environment(RuntimeConfig::default());
        let err = bootstrap.run(&env).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::BundleRun { ref bundle, .. } if bundle == "bad"
        ));

        let entries = log.lock().unwrap();
        assert!(entries.contains(&"run:good".to_string()));
        assert!(entries.contains(&"run:bad".to_string()));
        assert!(!entries.contains(&"run:never".to_string()));
    }
}
