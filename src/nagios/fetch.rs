//! Status page retrieval.
//!
//! # Responsibilities
//! - Build the `status.cgi` URL for the configured target
//! - Own the HTTP client and its timeout layers
//! - Perform exactly one GET per call, no retries
//!
//! # Timeouts
//! ```text
//! dial            TCP connect
//! tls handshake   added to the connect budget for https targets
//! request         whole call, connect through body read
//! ```

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Path and query of the "all hosts" view, embedded and header-stripped.
pub const STATUS_PATH: &str = "/nagios/cgi-bin/status.cgi";
const STATUS_QUERY: [(&str, &str); 3] = [("host", "all"), ("embedded", "1"), ("noheader", "1")];

const USER_AGENT: &str = concat!("nagios-exporter/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching the status page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Target could not be turned into a URL.
    #[error("invalid target '{target}': {reason}")]
    InvalidUrl { target: String, reason: String },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A timeout layer fired.
    #[error("request to {url} timed out: {source}")]
    Timeout { url: String, source: reqwest::Error },

    /// DNS, TCP or TLS failure.
    #[error("failed to connect to {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    /// Target answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body could not be read.
    #[error("failed to read body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    /// Any other request failure.
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Short category used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Client(_) => "client",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Connect { .. } => "connect",
            FetchError::Status { .. } => "status",
            FetchError::Body { .. } => "body",
            FetchError::Request { .. } => "request",
        }
    }

    fn classify(url: &Url, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            FetchError::Timeout { url, source }
        } else if source.is_connect() {
            FetchError::Connect { url, source }
        } else if source.is_body() || source.is_decode() {
            FetchError::Body { url, source }
        } else {
            FetchError::Request { url, source }
        }
    }
}

/// Fixed client settings, applied once at construction.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// `http` or `https`.
    pub scheme: String,
    pub dial_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            dial_timeout: Duration::from_secs(5),
            tls_handshake_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl FetchConfig {
    /// Budget for connection establishment.
    ///
    /// reqwest bounds TCP connect and TLS handshake with a single timeout.
    pub fn connect_timeout(&self) -> Duration {
        if self.scheme == "https" {
            self.dial_timeout + self.tls_handshake_timeout
        } else {
            self.dial_timeout
        }
    }
}

/// Build the status page URL for `target` (`host` or `host:port`).
pub fn status_url(scheme: &str, target: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        target: target.to_string(),
        reason,
    };

    if target.is_empty() || target.contains('/') {
        return Err(invalid("expected host or host:port".to_string()));
    }

    let mut url = Url::parse(&format!("{scheme}://{target}{STATUS_PATH}"))
        .map_err(|e| invalid(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(STATUS_QUERY);
    Ok(url)
}

/// Single-shot fetcher for one Nagios target.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    url: Url,
}

impl Fetcher {
    /// Create a fetcher. The client is built once and reused for every call.
    pub fn new(target: &str, config: &FetchConfig) -> Result<Self, FetchError> {
        let url = status_url(&config.scheme, target)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, url })
    }

    /// The URL fetched on every call.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the raw status page body.
    pub async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::classify(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::classify(&self.url, e))?;

        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched status page");
        Ok(body.to_vec())
    }
}
