//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Order book updates delivered to the callback
    OrderBookUpdates,
    /// Callback invocations that returned an error
    CallbackErrors,
    /// Subscription acknowledgments received
    SubscriptionAcks,
    /// Keep-alive ticks produced by the request source
    KeepAliveTicks,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::OrderBookUpdates => "tinvest_orderbook_updates_total",
            CounterMetric::CallbackErrors => "tinvest_callback_errors_total",
            CounterMetric::SubscriptionAcks => "tinvest_subscription_acks_total",
            CounterMetric::KeepAliveTicks => "tinvest_keepalive_ticks_total",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Start the Prometheus exporter on the given port
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}
