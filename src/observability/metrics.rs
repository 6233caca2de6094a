//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mvc_requests_total` (counter): requests by status
//! - `mvc_request_duration_seconds` (histogram): dispatch latency
//! - `mvc_template_lookups_total` (counter): locator lookups by kind, hit/miss
//! - `mvc_template_probes_total` (counter): filesystem probes
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("mvc_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("mvc_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_template_lookup(kind: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("mvc_template_lookups_total", "kind" => kind, "result" => result).increment(1);
}

pub fn record_template_probe() {
    metrics::counter!("mvc_template_probes_total").increment(1);
}
