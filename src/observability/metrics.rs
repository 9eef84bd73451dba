//! Metrics collection and exposition.
//!
//! # Metrics
//! - `panel_fetch_total` (counter): fetches by node type and outcome
//! - `config_reload_total` (counter): reload attempts by outcome
//!
//! Updates are no-ops until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::panel::{FetchOutcome, PanelError, PanelResult};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_fetch(node_type: &str, result: &PanelResult<FetchOutcome>) {
    let outcome = match result {
        Ok(FetchOutcome::Changed(_)) => "changed",
        Ok(FetchOutcome::Unchanged) => "unchanged",
        Err(e) => error_label(e),
    };
    ::metrics::counter!("panel_fetch_total", "node_type" => node_type.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_reload(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("config_reload_total", "outcome" => outcome).increment(1);
}

fn error_label(err: &PanelError) -> &'static str {
    match err {
        PanelError::InvalidEndpoint { .. } | PanelError::Client(_) => "setup_error",
        PanelError::Transport { .. } | PanelError::Status { .. } => "transport_error",
        PanelError::MalformedResponse(_) => "malformed_response",
        PanelError::MalformedRule { .. } => "malformed_rule",
        PanelError::InvalidPattern { .. } => "invalid_pattern",
        PanelError::InvalidInterval { .. } => "invalid_interval",
    }
}
