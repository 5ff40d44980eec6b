//! Internal telemetry for bookstore report runs.
//!
//! Structured logging via `tracing` and in-process counters for calendar
//! rebuilds and report runs.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
