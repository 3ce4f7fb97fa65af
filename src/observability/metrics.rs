//! Metrics collection and exposition.
//!
//! # Metrics
//! - `inertia_requests_total` (counter): requests seen, by `kind` (`inertia` / `plain`)
//! - `inertia_version_mismatch_total` (counter): stale-version 409s issued
//! - `inertia_redirect_rewritten_total` (counter): 302→303 rewrites, by `method`
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is opt-in via configuration

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter, serving scrapes on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(is_inertia: bool) {
    let kind = if is_inertia { "inertia" } else { "plain" };
    metrics::counter!("inertia_requests_total", "kind" => kind).increment(1);
}

pub fn record_version_mismatch() {
    metrics::counter!("inertia_version_mismatch_total").increment(1);
}

pub fn record_redirect_rewritten(method: &str) {
    metrics::counter!("inertia_redirect_rewritten_total", "method" => method.to_string()).increment(1);
}
