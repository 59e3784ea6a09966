//! Configuration validation.
//!
//! Pure function `ExporterConfig → Result<(), Vec<ValidationError>>`; every
//! problem is reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ExporterConfig;
use crate::http::server::HEALTH_PATH;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &ExporterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let path = &config.listener.metrics_path;
    if !path.starts_with('/') || path == "/" || path == HEALTH_PATH {
        errors.push(ValidationError::new(
            "listener.metrics_path",
            format!("'{}' must start with '/' and not shadow '/' or '{}'", path, HEALTH_PATH),
        ));
    }

    let address = &config.target.address;
    if address.is_empty() {
        errors.push(ValidationError::new("target.address", "must not be empty"));
    } else if address.contains("://") || address.contains('/') {
        errors.push(ValidationError::new(
            "target.address",
            format!("'{}' must be host or host:port, without scheme or path", address),
        ));
    }

    if !matches!(config.target.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "target.scheme",
            format!("'{}' must be http or https", config.target.scheme),
        ));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.dial_secs", timeouts.dial_secs),
        ("timeouts.tls_handshake_secs", timeouts.tls_handshake_secs),
        ("timeouts.request_secs", timeouts.request_secs),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if timeouts.request_secs < timeouts.dial_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be at least timeouts.dial_secs",
        ));
    }

    if config.listener.request_timeout_secs < timeouts.request_secs {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be at least timeouts.request_secs",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
