//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define relay metrics (requests, latency, dials, open connections)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by method, status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_dials_total` (counter): backend dials by endpoint, outcome
//! - `relay_open_connections` (gauge): backend connections currently open
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   and tests pay nothing
//! - Method labels come from the fixed method table, keeping cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::load_balancer::Endpoint;

pub const RELAY_REQUESTS: &str = "relay_requests_total";
pub const RELAY_REQUEST_DURATION: &str = "relay_request_duration_seconds";
pub const RELAY_DIALS: &str = "relay_dials_total";
pub const RELAY_OPEN_CONNECTIONS: &str = "relay_open_connections";

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(RELAY_REQUESTS, Unit::Count, "Relayed HTTP requests");
    describe_histogram!(
        RELAY_REQUEST_DURATION,
        Unit::Seconds,
        "Time from request receipt to response"
    );
    describe_counter!(RELAY_DIALS, Unit::Count, "Backend connection attempts");
    describe_gauge!(
        RELAY_OPEN_CONNECTIONS,
        Unit::Count,
        "Backend connections currently open"
    );
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(RELAY_REQUESTS, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(RELAY_REQUEST_DURATION, "method" => method.to_string())
        .record(start_time.elapsed());
}

pub fn record_dial(endpoint: &Endpoint, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!(RELAY_DIALS, "endpoint" => endpoint.to_string(), "outcome" => outcome).increment(1);
}

pub fn set_open_connections(open: u64) {
    gauge!(RELAY_OPEN_CONNECTIONS).set(open as f64);
}
