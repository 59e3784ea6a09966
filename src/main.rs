//! Nagios Exporter
//!
//! Republishes the host states shown on a Nagios `status.cgi` page as
//! Prometheus gauges.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   NAGIOS EXPORTER                    │
//!  Prometheus scrape  │  ┌─────────┐    ┌──────────┐    ┌─────────────────┐  │
//!  ───────────────────┼─▶│  http   │───▶│exposition│───▶│     nagios      │  │
//!                     │  │ server  │    │ registry │    │   collector     │  │
//!                     │  └─────────┘    └──────────┘    └───┬─────────┬───┘  │
//!                     │       ▲                             │         │      │
//!                     │       │ text format                 ▼         ▼      │
//!  ◀──────────────────┼───────┘                        ┌────────┐ ┌────────┐ │  GET status.cgi
//!                     │                                │ fetch  │ │ scrape │─┼──────────────▶ Nagios
//!                     │                                └────────┘ └────────┘ │
//!                     │  ┌────────────────────────────────────────────────┐  │
//!                     │  │  config (TOML + CLI)   observability (logs,    │  │
//!                     │  │                         self-telemetry)        │  │
//!                     │  └────────────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use nagios_exporter::config::{self, ConfigError, ExporterConfig};
use nagios_exporter::observability::{logging, metrics};
use nagios_exporter::{ExporterServer, NagiosCollector, Registry};

#[derive(Parser)]
#[command(name = "nagios-exporter")]
#[command(version, about = "Prometheus exporter for the Nagios status page", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Nagios host or host:port to scrape.
    #[arg(short, long)]
    target: Option<String>,

    /// Address to serve metrics on.
    #[arg(long)]
    listen_address: Option<String>,

    /// Path under which metrics are served.
    #[arg(long)]
    metrics_path: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ExporterConfig::default(),
        };

        if let Some(target) = &self.target {
            config.target.address = target.clone();
        }
        if let Some(addr) = &self.listen_address {
            config.listener.bind_address = addr.clone();
        }
        if let Some(path) = &self.metrics_path {
            config.listener.metrics_path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        config::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability)?;

    tracing::info!("nagios-exporter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        target_address = %config.target.address,
        scheme = %config.target.scheme,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    match config.to_toml() {
        Ok(effective) => tracing::debug!(config = %effective, "Effective configuration"),
        Err(e) => tracing::warn!(error = %e, "Could not render effective configuration"),
    }

    let telemetry = if config.observability.self_metrics {
        match metrics::init_metrics() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install self-telemetry recorder");
                None
            }
        }
    } else {
        None
    };

    let collector = NagiosCollector::new(&config.target.address, &config.fetch_config())?;
    tracing::info!(url = %collector.fetcher().url(), "Scraping Nagios status page");
    let registry = Registry::register(collector).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = ExporterServer::new(config, registry, telemetry);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
