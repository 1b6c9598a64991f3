pub mod metrics_collector;
pub mod structured_logger;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

pub use metrics_collector::MetricsCollector;
pub use structured_logger::StructuredLogger;

/// Installs the global Prometheus recorder. Must run before any
/// [`MetricsCollector`] is built, otherwise its handles stay detached.
/// The returned handle renders the text exposition format for `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}
