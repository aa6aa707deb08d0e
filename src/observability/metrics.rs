//! Metrics collection and exposition.
//!
//! # Metrics
//! - `frontdesk_dispatch_total` (counter): dispatches by outcome
//! - `frontdesk_dispatch_duration_seconds` (histogram): resolve + invoke latency
//! - `frontdesk_maintenance_blocked_total` (counter): requests refused by the gate
//! - `frontdesk_http_requests_total` (counter): front controller responses by status

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("frontdesk_dispatch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("frontdesk_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_maintenance_blocked() {
    metrics::counter!("frontdesk_maintenance_blocked_total").increment(1);
}

pub fn record_response(status: u16) {
    metrics::counter!("frontdesk_http_requests_total", "status" => status.to_string()).increment(1);
}
