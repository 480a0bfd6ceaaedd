//! Observability module
//!
//! Logging setup and structured log helpers.

pub mod telemetry;

pub use telemetry::{init_tracing, sanitize_for_log};
