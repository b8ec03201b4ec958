//! Metrics collection and exposition.
//!
//! # Metrics
//! - `airpulse_requests_total` (counter): API requests by method, route, status
//! - `airpulse_request_duration_seconds` (histogram): API latency
//! - `airpulse_ledger_calls_total` (counter): node calls by operation, outcome
//! - `airpulse_wallet_events_total` (counter): created/loaded/cleared/corrupted
//! - `airpulse_profile_submissions_total` (counter) and
//!   `airpulse_profile_submission_duration_seconds` (histogram)
//! - `airpulse_profile_queries_total` (counter): reads by kind, outcome
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "airpulse_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "airpulse_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_ledger_call(op: &'static str, ok: bool) {
    counter!(
        "airpulse_ledger_calls_total",
        "op" => op,
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_wallet_event(event: &'static str) {
    counter!("airpulse_wallet_events_total", "event" => event).increment(1);
}

pub fn record_profile_submission(ok: bool, start: Instant) {
    counter!("airpulse_profile_submissions_total", "outcome" => outcome(ok)).increment(1);
    histogram!("airpulse_profile_submission_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is one of `found`, `absent`, `error`.
pub fn record_profile_query(kind: &'static str, outcome: &'static str) {
    counter!(
        "airpulse_profile_queries_total",
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}
