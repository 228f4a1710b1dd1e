//! # Ignition Telemetry
//!
//! Structured logging setup and Prometheus metrics for the bootstrap
//! pipeline.
//!
//! Metrics live in an explicit [`prometheus::Registry`] owned by the
//! bootstrap container and passed to whatever needs it; there is no global
//! registry. Text exposition for the dashboard goes through
//! [`metrics::encode`].
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IGNITION_LOG_LEVEL` | `info` | Log level filter directives |

pub mod logging;
pub mod metrics;

pub use metrics::BootstrapMetrics;
