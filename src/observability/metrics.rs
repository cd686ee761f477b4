//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): requests by method, route, status
//! - `guard_request_duration_seconds` (histogram): latency by route
//! - `guard_trust_rejected_total` (counter): trust check rejections by reason
//! - `guard_rate_limited_total` (counter): rate-limited requests by endpoint
//! - `guard_contact_accepted_total` (counter): delivered contact messages
//! - `guard_config_reloads_total` (counter): applied config reloads

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "guard_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("guard_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_trust_rejected(reason: &'static str) {
    counter!("guard_trust_rejected_total", "reason" => reason).increment(1);
}

pub fn record_rate_limited(endpoint: &'static str) {
    counter!("guard_rate_limited_total", "endpoint" => endpoint).increment(1);
}

pub fn record_contact_accepted() {
    counter!("guard_contact_accepted_total").increment(1);
}

pub fn record_config_reload() {
    counter!("guard_config_reloads_total").increment(1);
}
