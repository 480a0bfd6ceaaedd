//! Telemetry & Observability
//!
//! Structured logging for the ingest server.
//! Features:
//! - Compact `tracing` output on stderr, keeping stdout for the record console
//! - Configurable log levels via RUST_LOG
//! - Request spans from tower-http's `TraceLayer`
//! - Escaping of client-supplied strings before they reach a log line

use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither RUST_LOG nor `--verbose` is given.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used by `--verbose`.
pub const VERBOSE_FILTER: &str = "bookdrop=debug,tower_http=info,info";

/// Initialize global tracing subscriber.
/// RUST_LOG wins when set; otherwise `verbose` picks between the quiet and
/// chatty defaults.
pub fn init_tracing(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(f) if !f.trim().is_empty() => f,
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    };
    init_tracing_with_filter(&filter);
}

/// Initialize with custom filter string
pub fn init_tracing_with_filter(filter: &str) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_level(true)
            .compact()
            .with_writer(std::io::stderr);

        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    });
}

/// Sanitize a string for safe log output by escaping control characters.
/// Prevents log injection where clients embed newlines to forge log entries.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Log a stored record at info level.
pub fn log_recorded(kind: &str, route: &str, count: usize, capacity: usize) {
    tracing::info!(
        kind = %sanitize_for_log(kind),
        route = route,
        count = count,
        capacity = capacity,
        "event_recorded"
    );
}

/// Log a rejected body at warn level.
pub fn log_rejected(route: &str, reason: &str) {
    tracing::warn!(route = route, reason = %sanitize_for_log(reason), "event_rejected");
}
