//! Status page parsing.
//!
//! # Responsibilities
//! - Walk the `table.status` rows of a Nagios `status.cgi` page
//! - Carry the host name across row-spanned host blocks
//! - Skip spacer rows that only exist for layout
//! - Aggregate per-service states into one binary status per host
//!
//! # Layout
//! ```text
//! <table class="status">
//!   <tr> header </tr>
//!   <tr> [host cell] [service cell] [status cell] ... </tr>   ← starts host block
//!   <tr> [empty]     [service cell] [status cell] ... </tr>   ← same host
//!   <tr> [empty]     [empty]        ...             </tr>     ← spacer
//! </table>
//! ```
//!
//! Host and service names sit inside nested layout tables, so each cell is
//! read through the same inner link path.

use std::collections::hash_map;
use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Rows of the status table, header included.
const ROW_SELECTOR: &str = "table.status > tbody > tr";

/// Link holding the host or service name inside its cell.
const NAME_LINK_SELECTOR: &str =
    "table > tbody > tr > td:nth-child(1) > table > tbody > tr > td > a";

const HOST_CELL: usize = 0;
const SERVICE_CELL: usize = 1;
const STATUS_CELL: usize = 2;

/// Errors raised while turning a document into a [`StatusTable`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body holds no markup at all.
    #[error("status page is empty")]
    EmptyDocument,

    /// A CSS selector failed to compile.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

/// Binary health of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Bad,
}

impl Status {
    /// Map the status cell text. Only the literal `OK` is healthy.
    pub fn from_text(text: &str) -> Self {
        if text == "OK" {
            Status::Ok
        } else {
            Status::Bad
        }
    }

    /// Gauge value: 0 healthy, 1 unhealthy.
    pub fn value(self) -> f64 {
        match self {
            Status::Ok => 0.0,
            Status::Bad => 1.0,
        }
    }
}

/// Sticky-bad merge rule.
///
/// `Bad` absorbs anything; an absent or `Ok` entry takes the incoming value.
pub fn merge(current: Option<Status>, incoming: Status) -> Status {
    match current {
        Some(Status::Bad) => Status::Bad,
        Some(Status::Ok) | None => incoming,
    }
}

/// Host → status mapping built by one parse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    hosts: HashMap<String, Status>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation for `host` into the table.
    pub fn record(&mut self, host: &str, status: Status) {
        match self.hosts.get_mut(host) {
            Some(current) => *current = merge(Some(*current), status),
            None => {
                self.hosts.insert(host.to_string(), merge(None, status));
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<Status> {
        self.hosts.get(host).copied()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Status)> {
        self.hosts.iter().map(|(host, status)| (host.as_str(), *status))
    }
}

impl IntoIterator for StatusTable {
    type Item = (String, Status);
    type IntoIter = hash_map::IntoIter<String, Status>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

/// Text of the three cells read from one data row.
///
/// Missing cells read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRow {
    pub host: String,
    pub service: String,
    pub status: String,
}

impl StatusRow {
    pub fn new(host: &str, service: &str, status: &str) -> Self {
        Self {
            host: host.to_string(),
            service: service.to_string(),
            status: status.to_string(),
        }
    }
}

/// Fold state threaded across rows.
#[derive(Default)]
struct Aggregation {
    current_host: Option<String>,
    table: StatusTable,
}

impl Aggregation {
    fn step(mut self, row: StatusRow) -> Self {
        if !row.host.is_empty() {
            self.current_host = Some(row.host);
        }

        if row.service.is_empty() {
            return self;
        }

        match self.current_host.as_deref() {
            Some(host) => self.table.record(host, Status::from_text(&row.status)),
            None => tracing::debug!(
                service = %row.service,
                "Service row precedes any host cell, ignoring"
            ),
        }

        self
    }
}

/// Aggregate data rows (header already removed) in document order.
pub fn aggregate<I>(rows: I) -> StatusTable
where
    I: IntoIterator<Item = StatusRow>,
{
    rows.into_iter()
        .fold(Aggregation::default(), Aggregation::step)
        .table
}

/// Compiled selectors for the status page layout.
///
/// Build once and reuse; parsing itself holds no state.
#[derive(Debug, Clone)]
pub struct StatusParser {
    rows: Selector,
    name_link: Selector,
}

impl StatusParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            rows: compile(ROW_SELECTOR)?,
            name_link: compile(NAME_LINK_SELECTOR)?,
        })
    }

    /// Parse a raw response body.
    ///
    /// Bytes that are not UTF-8 (Latin-1 plugin output is common) are replaced
    /// rather than rejected.
    pub fn parse_bytes(&self, body: &[u8]) -> Result<StatusTable, ParseError> {
        self.parse(&String::from_utf8_lossy(body))
    }

    /// Parse a status page into a [`StatusTable`].
    ///
    /// A document without a status table, or with only the header row, yields
    /// an empty table. A body with no content is an error.
    pub fn parse(&self, document: &str) -> Result<StatusTable, ParseError> {
        if document.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let html = Html::parse_document(document);
        let data_rows = html
            .select(&self.rows)
            .skip(1)
            .map(|row| read_row(row, &self.name_link));

        Ok(aggregate(data_rows))
    }
}

/// One-shot parse of a raw body with freshly compiled selectors.
pub fn parse_bytes(body: &[u8]) -> Result<StatusTable, ParseError> {
    StatusParser::new()?.parse_bytes(body)
}

/// One-shot parse with freshly compiled selectors.
pub fn parse(document: &str) -> Result<StatusTable, ParseError> {
    StatusParser::new()?.parse(document)
}

fn compile(selector: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector,
        reason: e.to_string(),
    })
}

fn read_row(row: ElementRef<'_>, name_link: &Selector) -> StatusRow {
    let cells: Vec<ElementRef<'_>> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect();

    let name_in = |index: usize| {
        cells
            .get(index)
            .map(|cell| cell.select(name_link).flat_map(|a| a.text()).collect::<String>())
            .unwrap_or_default()
    };

    StatusRow {
        host: name_in(HOST_CELL),
        service: name_in(SERVICE_CELL),
        status: cells
            .get(STATUS_CELL)
            .map(|cell| cell.text().collect::<String>())
            .unwrap_or_default(),
    }
}
