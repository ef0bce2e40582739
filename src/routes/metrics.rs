//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "relay_requests_total",
        "Total number of chat requests processed"
    );
    metrics::describe_histogram!(
        "relay_request_duration_seconds",
        "Time until upstream response headers were received"
    );
    metrics::describe_counter!(
        "relay_upstream_errors_total",
        "Upstream calls that failed before a response"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a request
///
/// `status` is the upstream status code, or a failure label.
pub fn record_request(status: &str, model: &str, duration_secs: f64) {
    metrics::counter!("relay_requests_total", "status" => status.to_string(), "model" => model.to_string())
        .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "model" => model.to_string())
        .record(duration_secs);
}

/// Record an upstream failure by kind
pub fn record_upstream_error(kind: &str) {
    metrics::counter!("relay_upstream_errors_total", "kind" => kind.to_string()).increment(1);
}
