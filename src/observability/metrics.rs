//! Exporter self-telemetry.
//!
//! # Metrics
//! - `nagios_exporter_scrapes_total` (counter): scrape cycles by outcome
//! - `nagios_exporter_scrape_seconds` (histogram): cycle latency
//! - `nagios_exporter_hosts` (gauge): hosts seen by the last good scrape
//!
//! Recorded through the `metrics` facade; rendered by the Prometheus
//! recorder handle and appended to the `/metrics` response.

use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const SCRAPES_TOTAL: &str = "nagios_exporter_scrapes_total";
pub const SCRAPE_SECONDS: &str = "nagios_exporter_scrape_seconds";
pub const HOSTS: &str = "nagios_exporter_hosts";

/// Result of one scrape cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success,
    Failure,
}

impl ScrapeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeOutcome::Success => "success",
            ScrapeOutcome::Failure => "failure",
        }
    }
}

/// Install the global Prometheus recorder and describe our metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(SCRAPES_TOTAL, "Nagios scrape cycles by outcome.");
    metrics::describe_histogram!(
        SCRAPE_SECONDS,
        metrics::Unit::Seconds,
        "Latency of Nagios scrape cycles."
    );
    metrics::describe_gauge!(HOSTS, "Hosts reported by the last successful scrape.");

    tracing::info!("Self-telemetry recorder installed");
    Ok(handle)
}

pub fn record_scrape(outcome: ScrapeOutcome, elapsed: Duration) {
    metrics::counter!(SCRAPES_TOTAL, "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!(SCRAPE_SECONDS).record(elapsed.as_secs_f64());
}

pub fn record_hosts(count: usize) {
    metrics::gauge!(HOSTS).set(count as f64);
}
