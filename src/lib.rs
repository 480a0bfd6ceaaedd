//! bookdrop - Digital Library Ingestion Server
//!
//! Receives borrow, return and new-book records as JSON over HTTP, keeps the
//! most recent ones in a bounded in-memory log, echoes them to the console
//! and serves them to a browser dashboard.
//!
//! - **Event log**: bounded, newest-first, safe to share across handlers
//! - **Server**: axum routes for ingest, query, health and server identity
//! - **Console**: colored rendering of every record as it arrives
//!
//! # Quick Start
//!
//! ```ignore
//! use bookdrop::{config::Config, event_log::EventLog, server};
//! use std::sync::Arc;
//!
//! let config = Config::load(None)?;
//! let log = Arc::new(EventLog::new(config.log.capacity)?);
//! server::serve(&config, log, bookdrop::shutdown_requested()).await?;
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod event_log;
pub mod net;
pub mod observability;
pub mod output;
pub mod server;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::sync::Notify;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn shutdown_notify() -> &'static Notify {
    static NOTIFY: OnceLock<Notify> = OnceLock::new();
    NOTIFY.get_or_init(Notify::new)
}

/// Ask the server to stop accepting connections and drain.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    shutdown_notify().notify_waiters();
}

pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Resolves once `request_shutdown` has been called.
pub async fn shutdown_requested() {
    let notified = shutdown_notify().notified();
    if is_shutdown_requested() {
        return;
    }
    notified.await;
}
