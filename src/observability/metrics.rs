//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wrc_requests_total` (counter): requests by method, route, status
//! - `wrc_request_duration_seconds` (histogram): latency by route
//! - `wrc_upstream_errors_total` (counter): failed upstream calls by route
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics listener started");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    counter!(
        "wrc_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("wrc_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(route: &'static str) {
    counter!("wrc_upstream_errors_total", "route" => route).increment(1);
}
