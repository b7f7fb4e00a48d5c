//! Prometheus metrics for dispatcher observability.

use metrics::{counter, gauge, histogram};

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record an inbound webhook request.
pub fn webhook_received() {
    counter!("ops_webhooks_received_total").increment(1);
}

/// Record a deployment run reaching a terminal status.
pub fn deployment_finished(status: &str) {
    counter!("ops_deployments_total", "status" => status.to_string()).increment(1);
}

/// Record deployment duration.
pub fn deployment_duration(duration_ms: u64) {
    histogram!("ops_deployment_duration_ms").record(duration_ms as f64);
}

/// Set the most recent post-deployment health percentage.
pub fn health_percentage(percentage: u32) {
    gauge!("ops_health_percentage").set(percentage as f64);
}

/// Record an error occurrence by taxonomy category.
pub fn error_recorded(category: &str) {
    counter!("ops_errors_total", "category" => category.to_string()).increment(1);
}
