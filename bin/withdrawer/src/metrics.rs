//! Prometheus metrics for the withdrawer.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the withdrawal pipeline.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    /// Register metric descriptions with the global registry.
    fn register_descriptions() {
        describe_counter!(
            "withdrawer_pipeline_runs_total",
            "Total number of withdrawal pipeline invocations"
        );
        describe_counter!(
            "withdrawer_bundles_confirmed_total",
            "Total number of bundles confirmed on chain"
        );
        describe_counter!(
            "withdrawer_pipeline_failures_total",
            "Total failed pipeline invocations by error code"
        );
        describe_histogram!(
            "withdrawer_pipeline_duration_seconds",
            "Duration of each pipeline invocation in seconds"
        );
    }

    /// Record the start of a pipeline invocation.
    pub fn record_attempt(&self) {
        counter!("withdrawer_pipeline_runs_total").increment(1);
    }

    /// Record a confirmed bundle.
    pub fn record_confirmed(&self) {
        counter!("withdrawer_bundles_confirmed_total").increment(1);
    }

    /// Record a failed pipeline invocation.
    pub fn record_failed(&self, code: i64) {
        counter!("withdrawer_pipeline_failures_total", "code" => code.to_string()).increment(1);
    }

    /// Record how long a pipeline invocation took, success or not.
    pub fn record_duration(&self, duration: Duration) {
        histogram!("withdrawer_pipeline_duration_seconds").record(duration.as_secs_f64());
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
