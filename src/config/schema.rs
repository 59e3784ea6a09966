//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::nagios::FetchConfig;

/// Root configuration for the exporter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExporterConfig {
    /// HTTP listener serving the metrics endpoint.
    pub listener: ListenerConfig,

    /// Monitored Nagios instance.
    pub target: TargetConfig,

    /// Timeouts for requests to the target.
    pub timeouts: TimeoutConfig,

    /// Logging and self-telemetry.
    pub observability: ObservabilityConfig,
}

impl ExporterConfig {
    /// Client settings handed to the fetcher.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            scheme: self.target.scheme.clone(),
            dial_timeout: Duration::from_secs(self.timeouts.dial_secs),
            tls_handshake_timeout: Duration::from_secs(self.timeouts.tls_handshake_secs),
            request_timeout: Duration::from_secs(self.timeouts.request_secs),
        }
    }

    /// Render the effective configuration (file, defaults and overrides
    /// merged) in config file syntax.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9667").
    pub bind_address: String,

    /// Path the metrics are served on.
    pub metrics_path: String,

    /// Upper bound for serving one HTTP request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9667".to_string(),
            metrics_path: "/metrics".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Host or host:port of the Nagios web interface.
    pub address: String,

    /// "http" or "https".
    pub scheme: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            scheme: "http".to_string(),
        }
    }
}

/// Timeouts for the outbound scrape, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connection establishment.
    pub dial_secs: u64,

    /// TLS handshake (https targets only).
    pub tls_handshake_secs: u64,

    /// Whole request, connect through body.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            dial_secs: 5,
            tls_handshake_secs: 5,
            request_secs: 15,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Append exporter self-telemetry to the metrics endpoint.
    pub self_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            self_metrics: true,
        }
    }
}
