//! Prometheus metrics for the bootstrap pipeline.
//!
//! Metric names follow `ignition_bootstrap_<metric>_<unit>`. All collectors
//! are registered into an explicit registry handed in by the caller; the
//! same registry backs the dashboard's `/metrics` exposition.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Collectors covering module assembly, service startup, and shutdown.
#[derive(Clone)]
pub struct BootstrapMetrics {
    /// Modules assembled into the catalogue, labeled by origin
    /// (`static` / `dynamic`).
    pub modules_assembled: IntCounterVec,
    /// Services that reached `Started`.
    pub services_started: IntCounter,
    /// Time spent inside the service start sequence, in seconds.
    pub service_start_seconds: Histogram,
    /// Wall-clock bootstrap duration in seconds, set once after startup.
    pub startup_seconds: Gauge,
    /// Services whose stop raised during shutdown.
    pub stop_failures: IntCounter,
}

impl BootstrapMetrics {
    /// Create the collectors and register them with `registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let modules_assembled = IntCounterVec::new(
            Opts::new(
                "ignition_bootstrap_modules_assembled_total",
                "Modules assembled into the catalogue, by origin",
            ),
            &["origin"],
        )?;
        let services_started = IntCounter::new(
            "ignition_bootstrap_services_started_total",
            "Lifecycle-managed services that started successfully",
        )?;
        let service_start_seconds = Histogram::with_opts(HistogramOpts::new(
            "ignition_bootstrap_service_start_seconds",
            "Time spent starting lifecycle-managed services",
        ))?;
        let startup_seconds = Gauge::new(
            "ignition_bootstrap_startup_seconds",
            "Wall-clock time from bootstrap entry to all services started",
        )?;
        let stop_failures = IntCounter::new(
            "ignition_bootstrap_stop_failures_total",
            "Services whose stop raised during shutdown",
        )?;

        registry.register(Box::new(modules_assembled.clone()))?;
        registry.register(Box::new(services_started.clone()))?;
        registry.register(Box::new(service_start_seconds.clone()))?;
        registry.register(Box::new(startup_seconds.clone()))?;
        registry.register(Box::new(stop_failures.clone()))?;

        Ok(Self {
            modules_assembled,
            services_started,
            service_start_seconds,
            startup_seconds,
            stop_failures,
        })
    }
}

/// Encode every collector in `registry` as Prometheus text exposition.
pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
