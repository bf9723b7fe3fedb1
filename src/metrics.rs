use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Only one recorder can exist per process; later calls return the same handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            // Pre-register counters so they appear even before the first increment.
            counter!("trades_created_total").absolute(0);
            counter!("trades_updated_total").absolute(0);
            counter!("trades_deleted_total").absolute(0);
            counter!("strategies_created_total").absolute(0);
            counter!("auth_failures_total").absolute(0);
            counter!("statistics_computed_total").absolute(0);

            histogram!("statistics_input_trades").record(0.0);

            handle
        })
        .clone()
}
