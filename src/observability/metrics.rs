//! Metrics collection and exposition.
//!
//! # Metrics
//! - `console_requests_total` (counter): requests by method, status
//! - `console_request_duration_seconds` (histogram): latency distribution
//! - `console_forwarded_headers_applied_total` (counter): adopted proxy headers
//! - `console_realtime_sessions` (gauge): open realtime sessions
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Exporter runs its own HTTP listener, separate from the console port

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("console_requests_total", &labels).increment(1);
    histogram!("console_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record that a forwarded header value was adopted.
pub fn record_forwarded_header(header: &'static str) {
    counter!("console_forwarded_headers_applied_total", "header" => header).increment(1);
}

/// Publish the number of open realtime sessions.
pub fn set_realtime_sessions(count: usize) {
    gauge!("console_realtime_sessions").set(count as f64);
}
