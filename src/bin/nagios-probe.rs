//! One-shot diagnostic: scrape a target (or parse a saved page) and print
//! the aggregated host table as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use nagios_exporter::nagios::{scrape, FetchConfig, NagiosCollector, StatusTable};

#[derive(Parser)]
#[command(name = "nagios-probe")]
#[command(about = "Print the host table the exporter would publish", long_about = None)]
struct Cli {
    /// Nagios host or host:port to scrape.
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    target: Option<String>,

    /// Parse a saved status.cgi page instead of fetching.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// "http" or "https".
    #[arg(long, default_value = "http")]
    scheme: String,

    /// Total request timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nagios_exporter=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let table = match run(&cli).await {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let hosts: BTreeMap<String, u8> = table
        .into_iter()
        .map(|(host, status)| (host, status.value() as u8))
        .collect();

    match serde_json::to_string_pretty(&hosts) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<StatusTable, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.file {
        let body = std::fs::read(path)?;
        return Ok(scrape::parse_bytes(&body)?);
    }

    let target = cli.target.as_deref().unwrap_or_default();
    let config = FetchConfig {
        scheme: cli.scheme.clone(),
        request_timeout: Duration::from_secs(cli.timeout),
        ..FetchConfig::default()
    };
    let collector = NagiosCollector::new(target, &config)?;
    Ok(collector.scrape().await?)
}
