//! Nagios scraping subsystem.
//!
//! # Data Flow
//! ```text
//! NagiosCollector::collect (one call per /metrics request)
//!     → fetch.rs   (GET status.cgi, layered timeouts, no retries)
//!     → scrape.rs  (table walk, host carry-forward, sticky-bad fold)
//!     → collector.rs emits duration + per-host gauges, or one invalid record
//! ```
//!
//! # Design Decisions
//! - Parsing is a pure function of the body; no state survives a cycle
//! - Any non-"OK" status text counts as unhealthy
//! - Failures are logged through an injected sink and never escape `collect`

pub mod collector;
pub mod fetch;
pub mod scrape;

pub use collector::{EventSink, NagiosCollector, ScrapeError, TracingEventSink};
pub use fetch::{FetchConfig, FetchError, Fetcher};
pub use scrape::{merge, parse, ParseError, Status, StatusParser, StatusTable};
