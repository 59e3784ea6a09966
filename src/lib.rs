//! Nagios status page exporter library.

pub mod config;
pub mod exposition;
pub mod http;
pub mod nagios;
pub mod observability;

pub use config::ExporterConfig;
pub use exposition::Registry;
pub use http::ExporterServer;
pub use nagios::NagiosCollector;
