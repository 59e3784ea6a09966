//! HTTP export surface.
//!
//! # Data Flow
//! ```text
//! Prometheus scrape
//!     → server.rs (axum router, trace + timeout layers)
//!     → Registry::gather (one Nagios collection per request)
//!     → text exposition, or 500 on an invalid record
//! ```

pub mod server;

pub use server::ExporterServer;
