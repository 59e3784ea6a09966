//! Nagios collector: fetch, parse and emit one scrape cycle.
//!
//! # Cycle
//! ```text
//! start timer
//!     → Fetcher::fetch
//!     → StatusParser::parse_bytes
//!     ├─ failure: EventSink::scrape_failed + one Metric::Invalid, stop
//!     └─ success: nagios_request_duration_seconds
//!                 then nagios_host_status{host} per host
//! ```

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::exposition::{gauge_desc, Collector, Desc, ExpositionError, Metric};
use crate::nagios::fetch::{FetchConfig, FetchError, Fetcher};
use crate::nagios::scrape::{ParseError, StatusParser, StatusTable};
use crate::observability::metrics as telemetry;

pub const HOST_STATUS_METRIC: &str = "nagios_host_status";
pub const DURATION_METRIC: &str = "nagios_request_duration_seconds";

/// Event name attached to scrape failure logs.
pub const SCRAPE_ERROR_EVENT: &str = "ERROR_NAGIOS_SCRAPE";

/// A failed scrape cycle.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A record could not be built from the scraped table.
    #[error(transparent)]
    Exposition(#[from] ExpositionError),
}

impl ScrapeError {
    /// Failure category for logs, e.g. `fetch.timeout`.
    pub fn kind(&self) -> String {
        match self {
            ScrapeError::Fetch(e) => format!("fetch.{}", e.kind()),
            ScrapeError::Parse(ParseError::EmptyDocument) => "parse.empty".to_string(),
            ScrapeError::Parse(ParseError::Selector { .. }) => "parse.selector".to_string(),
            ScrapeError::Exposition(_) => "exposition".to_string(),
        }
    }
}

/// Receives scrape failures for operator visibility.
pub trait EventSink: Send + Sync + 'static {
    fn scrape_failed(&self, target: &str, error: &ScrapeError);
}

/// Default sink: one structured `tracing` error event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn scrape_failed(&self, target: &str, error: &ScrapeError) {
        tracing::error!(
            event = SCRAPE_ERROR_EVENT,
            instance = %target,
            kind = %error.kind(),
            error = %error,
            "Nagios scrape failed"
        );
    }
}

/// Republishes the status page of one Nagios target.
pub struct NagiosCollector {
    target: String,
    fetcher: Fetcher,
    parser: StatusParser,
    status: Arc<Desc>,
    duration: Arc<Desc>,
    events: Arc<dyn EventSink>,
}

impl NagiosCollector {
    /// Build the collector, its HTTP client, the page parser and both
    /// descriptors.
    pub fn new(target: &str, config: &FetchConfig) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(target, config)?;

        Ok(Self {
            target: target.to_string(),
            fetcher,
            parser: StatusParser::new()?,
            status: Arc::new(gauge_desc(
                HOST_STATUS_METRIC,
                "Status of a host monitored by Nagios, 0 is OK.",
                &["host"],
            )?),
            duration: Arc::new(gauge_desc(
                DURATION_METRIC,
                "How long the exporter took to scrape the health check endpoint.",
                &[],
            )?),
            events: Arc::new(TracingEventSink),
        })
    }

    /// Replace the failure event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetch and parse once, without emitting anything.
    pub async fn scrape(&self) -> Result<StatusTable, ScrapeError> {
        let body = self.fetcher.fetch().await?;
        Ok(self.parser.parse_bytes(&body)?)
    }

    async fn fail(&self, tx: &mpsc::Sender<Metric>, error: ScrapeError) {
        self.events.scrape_failed(&self.target, &error);
        if tx.send(Metric::invalid(error)).await.is_err() {
            tracing::debug!(instance = %self.target, "Metric receiver closed before error record");
        }
    }
}

impl Collector for NagiosCollector {
    async fn describe(&self, tx: &mpsc::Sender<Arc<Desc>>) {
        for desc in [&self.status, &self.duration] {
            if tx.send(Arc::clone(desc)).await.is_err() {
                return;
            }
        }
    }

    async fn collect(&self, tx: &mpsc::Sender<Metric>) {
        let start = Instant::now();

        let hosts = match self.scrape().await {
            Ok(hosts) => hosts,
            Err(error) => {
                telemetry::record_scrape(telemetry::ScrapeOutcome::Failure, start.elapsed());
                self.fail(tx, error).await;
                return;
            }
        };

        let elapsed = start.elapsed();
        telemetry::record_scrape(telemetry::ScrapeOutcome::Success, elapsed);
        telemetry::record_hosts(hosts.len());

        tracing::debug!(
            instance = %self.target,
            hosts = hosts.len(),
            duration_secs = elapsed.as_secs_f64(),
            "Nagios scrape complete"
        );

        let duration = Metric::gauge(&self.duration, elapsed.as_secs_f64(), Vec::<String>::new());
        let records = std::iter::once(duration)
            .chain(
                hosts
                    .into_iter()
                    .map(|(host, status)| Metric::gauge(&self.status, status.value(), [host])),
            )
            .collect::<Result<Vec<_>, _>>();

        let records = match records {
            Ok(records) => records,
            Err(e) => {
                self.fail(tx, ScrapeError::Exposition(e)).await;
                return;
            }
        };

        for metric in records {
            if tx.send(metric).await.is_err() {
                tracing::debug!(instance = %self.target, "Metric receiver closed mid-collection");
                return;
            }
        }
    }
}
