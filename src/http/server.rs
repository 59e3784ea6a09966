//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the metrics, landing and health handlers
//! - Wire up middleware (tracing, request timeout)
//! - Run one collection per metrics request
//! - Graceful shutdown on Ctrl+C / SIGTERM

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ExporterConfig;
use crate::exposition::{Registry, TEXT_FORMAT};
use crate::nagios::NagiosCollector;

/// Liveness endpoint; never touches the target.
pub const HEALTH_PATH: &str = "/-/healthy";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry<NagiosCollector>>,
    /// Self-telemetry appended after the Nagios families.
    pub telemetry: Option<PrometheusHandle>,
    pub metrics_path: Arc<str>,
}

/// HTTP server exposing the Nagios metrics.
pub struct ExporterServer {
    router: Router,
    config: ExporterConfig,
}

impl ExporterServer {
    /// Create a new server around a registered collector.
    pub fn new(
        config: ExporterConfig,
        registry: Registry<NagiosCollector>,
        telemetry: Option<PrometheusHandle>,
    ) -> Self {
        let state = AppState {
            registry: Arc::new(registry),
            telemetry,
            metrics_path: Arc::from(config.listener.metrics_path.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ExporterConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.listener.metrics_path, get(metrics_handler))
            .route("/", get(landing_handler))
            .route(HEALTH_PATH, get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            metrics_path = %self.config.listener.metrics_path,
            target = %self.config.target.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }
}

/// One Nagios collection, rendered in text format.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.registry.gather().await {
        Ok(mut body) => {
            if let Some(telemetry) = &state.telemetry {
                body.push_str(&telemetry.render());
            }
            ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("An error has occurred while serving metrics:\n\n{}", e),
        )
            .into_response(),
    }
}

async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Nagios Exporter</title></head>\n\
         <body>\n\
         <h1>Nagios Exporter</h1>\n\
         <p>Target: {}</p>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.registry.collector().target(),
        state.metrics_path
    ))
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}
