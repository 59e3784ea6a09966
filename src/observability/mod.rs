//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (exporter self-telemetry via the metrics facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → /metrics, appended after the Nagios families
//! ```
//!
//! # Design Decisions
//! - Log level from config, overridden by RUST_LOG
//! - Self-telemetry is optional; the facade is a no-op without a recorder

pub mod logging;
pub mod metrics;
