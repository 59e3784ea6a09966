//! Metric exposition subsystem.
//!
//! # Data Flow
//! ```text
//! Registry::register(collector)
//!     → Collector::describe → prometheus Desc records → checked once
//!
//! Registry::gather()
//!     → Collector::collect → Metric records over a bounded channel
//!     → any Metric::Invalid fails the gather
//!     → samples land in per-gather GaugeVecs → prometheus::TextEncoder
//! ```
//!
//! # Design Decisions
//! - Collectors push records into a channel owned by the caller
//! - A collection is all-or-nothing: one invalid record discards the rest
//! - Descriptors are immutable and shared via `Arc`

pub mod metric;
pub mod registry;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

pub use metric::{gauge_desc, InvalidMetric, Metric, Sample};
pub use prometheus::core::Desc;
pub use prometheus::TEXT_FORMAT;
pub use registry::Registry;

/// Source of metric records, invoked once per scrape.
pub trait Collector: Send + Sync + 'static {
    /// Send every descriptor this collector can emit. No I/O.
    fn describe(&self, tx: &mpsc::Sender<Arc<Desc>>) -> impl Future<Output = ()> + Send;

    /// Run one collection cycle, sending records into `tx`.
    ///
    /// Sends may wait on a slow consumer; failures are reported as a single
    /// [`Metric::Invalid`] record rather than returned.
    fn collect(&self, tx: &mpsc::Sender<Metric>) -> impl Future<Output = ()> + Send;
}

/// Errors raised while registering or gathering metrics.
#[derive(Debug, Error)]
pub enum ExpositionError {
    /// Invalid names, duplicate descriptors or encoder failures.
    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),

    #[error("metric '{metric}': expected {expected} label values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("collected metric '{0}' was not described")]
    Undescribed(String),

    /// The collector emitted an invalid record.
    #[error("{0}")]
    Collect(String),
}
