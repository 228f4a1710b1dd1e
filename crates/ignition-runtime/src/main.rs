//! Ignition runtime entry point.
//!
//! Startup: logging, configuration (optional TOML file via
//! `IGNITION_CONFIG` plus `IGNITION_*` overrides), bootstrap container with
//! its bundles, then the initializer. On success the process stays up until
//! Ctrl-C or SIGTERM, at which point the armed shutdown hook stops every
//! started service, best effort. Any fatal bootstrap error exits non-zero.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use ignition_core::bootstrap::Bootstrap;
use ignition_core::config::RuntimeConfig;
use ignition_runtime::init::Initializer;
use ignition_runtime::modules::BuiltinModulesBundle;

fn load_config() -> Result<RuntimeConfig> {
    let mut config = match std::env::var("IGNITION_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            RuntimeConfig::load(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        Err(_) => RuntimeConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("installing Ctrl-C handler")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    ignition_telemetry::logging::init();

    let config = load_config()?;

    let mut bootstrap = Bootstrap::new().context("creating bootstrap container")?;
    bootstrap.add_bundle(Box::new(BuiltinModulesBundle));
    let env = bootstrap.environment(config.clone());
    bootstrap.run(&env).context("running bootstrap bundles")?;

    let runtime = Initializer::new()
        .start(&bootstrap, config)
        .await
        .context("ignition bootstrap failed")?;

    info!("runtime is running; press Ctrl+C to stop");
    let signal = shutdown_signal().await;

    let failures = runtime.shutdown().await;
    if failures > 0 {
        info!(failures, "shutdown completed with stop failures");
    } else {
        info!("shutdown complete");
    }
    signal
}
