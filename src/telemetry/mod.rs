//! Telemetry module
//!
//! Structured logging and Prometheus counters

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{increment, install_exporter, CounterMetric};

use crate::config::Config;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &Config) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level)?;

    if let Some(port) = config.metrics_port {
        install_exporter(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
