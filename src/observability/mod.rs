//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! wallet / ledger / profile / http
//!     → logging.rs (structured events, request id on every API span)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
