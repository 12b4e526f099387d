//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): total requests by method, status
//! - `edge_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is unconditional and cheap; exposition is opt-in
//! - Labels stay low-cardinality (method, status)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(error) => tracing::error!(error = %error, "Failed to install metrics exporter"),
    }
}

/// Record one served request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "method" => method.to_string()).record(elapsed);
}
