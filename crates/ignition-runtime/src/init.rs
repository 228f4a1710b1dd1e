//! # Runtime Initializer
//!
//! End-to-end bootstrap control flow:
//!
//! 1. Assemble the fixed static module set in program order.
//! 2. Run the dynamic module loader against the configured search paths.
//! 3. Resolve the catalogue into the component graph (freezes the set).
//! 4. Hand every extracted network handler to the transport registrar.
//! 5. Start every extracted lifecycle service, fail fast.
//! 6. Capture the shutdown snapshot and arm the hook.
//!
//! Any error on steps 2-5 is fatal: the caller exits non-zero before any
//! service becomes reachable.

use std::time::Instant;

use tracing::info;

use ignition_core::bootstrap::Bootstrap;
use ignition_core::config::RuntimeConfig;
use ignition_core::error::BootstrapError;
use ignition_core::lifecycle::{Lifecycle, ShutdownHook};
use ignition_core::manifest::load_dynamic_modules;
use ignition_core::module::{ModuleDescriptor, ModuleOrigin, ModuleSet};
use ignition_telemetry::metrics::BootstrapMetrics;

use crate::modules::{ConfigModule, DashboardModule, MetricsModule, ServerModule};

const STARTUP_BANNER: &str = r"
 *************************************************
  _                _  _    _
 (_)  __ _  _ __  (_)| |_ (_)  ___   _ __
 | | / _` || '_ \ | || __|| | / _ \ | '_ \
 | || (_| || | | || || |_ | || (_) || | | |
 |_| \__, ||_| |_||_| \__||_| \___/ |_| |_|
     |___/
 *************************************************";

/// Name of the machine this runtime is running on. Informational only.
#[must_use]
pub fn host_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string())
}

/// The started runtime: catalogued modules, lifecycle handles, and the armed
/// shutdown hook.
pub struct Runtime {
    modules: Vec<ModuleDescriptor>,
    lifecycle: Lifecycle,
    hook: ShutdownHook,
    pipeline: BootstrapMetrics,
}

impl Runtime {
    /// Descriptors of every assembled module, in catalogue order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Names of the managed services, in extraction order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.lifecycle
            .handles()
            .iter()
            .map(|handle| handle.name())
            .collect()
    }

    /// Whether the shutdown hook still holds its snapshot.
    #[must_use]
    pub fn is_hook_armed(&self) -> bool {
        self.hook.is_armed()
    }

    /// Stop every started service, best effort. Safe to call more than once;
    /// only the first call does work. Returns the number of stop failures.
    pub async fn shutdown(&self) -> usize {
        let failures = self.hook.fire().await;
        self.pipeline.stop_failures.inc_by(failures as u64);
        failures
    }
}

/// Assembles and starts the runtime.
pub struct Initializer {
    started_at: Instant,
    host_name: String,
}

impl Default for Initializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Initializer {
    /// Create an initializer; the startup clock starts here.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            host_name: host_name(),
        }
    }

    /// Run the full bootstrap against the container's shared state.
    pub async fn start(
        self,
        bootstrap: &Bootstrap,
        config: RuntimeConfig,
    ) -> Result<Runtime, BootstrapError> {
        info!("** ignition starting up **");
        let env = bootstrap.environment(config);

        // Static set, fixed program order.
        let mut set = ModuleSet::new();
        set.push_static(Box::new(ConfigModule));
        set.push_static(Box::new(MetricsModule));
        set.push_static(Box::new(DashboardModule));
        set.push_static(Box::new(ServerModule));

        // Dynamic modules append behind the static set.
        load_dynamic_modules(
            &mut set,
            bootstrap.module_registry(),
            &env.config.modules.search_paths,
        )?;

        let modules = set.descriptors();
        let pipeline = bootstrap.pipeline_metrics();
        for descriptor in &modules {
            let origin = match descriptor.origin {
                ModuleOrigin::Static => "static",
                ModuleOrigin::Dynamic => "dynamic",
            };
            pipeline.modules_assembled.with_label_values(&[origin]).inc();
        }
        info!(modules = modules.len(), "module catalogue frozen");

        // Resolve and extract by capability role; binding order is start
        // order.
        let graph = set.resolve(env)?;
        let transport = graph.transport().ok_or(BootstrapError::TransportNotBound)?;
        transport.register_services(graph.network_handlers());

        let mut lifecycle = Lifecycle::new(graph.lifecycle_services());
        let start_clock = Instant::now();
        lifecycle.start_all().await?;
        pipeline
            .service_start_seconds
            .observe(start_clock.elapsed().as_secs_f64());

        let snapshot = lifecycle.snapshot();
        pipeline.services_started.inc_by(snapshot.len() as u64);
        pipeline
            .startup_seconds
            .set(self.started_at.elapsed().as_secs_f64());
        let hook = ShutdownHook::arm(snapshot);

        info!(
            "{}\n    Startup Time : {} ms\n    Host Name    : {}",
            STARTUP_BANNER,
            self.started_at.elapsed().as_millis(),
            self.host_name,
        );
        info!("** ignition startup complete **");

        Ok(Runtime {
            modules,
            lifecycle,
            hook,
            pipeline: pipeline.clone(),
        })
    }
}
