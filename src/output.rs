//! Output Control Module
//!
//! Console rendering of ingested records:
//! - `quiet`: suppress per-record output
//! - `show_raw_json`: append the pretty-printed request body
//! - `color`: ANSI colors on or off
//!
//! Rendering functions return strings so they can be checked without a
//! terminal; the `print_*` wrappers respect the global flags.

use colored::*;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::UiConfig;
use crate::event_log::{Event, EventKind};
use crate::net::ServerInfo;

/// Placeholder shown for payload fields the client did not send.
pub const MISSING: &str = "N/A";

const SEPARATOR_WIDTH: usize = 60;

/// Global output mode flags (set once at startup)
static QUIET: AtomicBool = AtomicBool::new(false);
static SHOW_RAW_JSON: AtomicBool = AtomicBool::new(true);

/// Initialize output modes from config
pub fn init(ui: &UiConfig) {
    QUIET.store(ui.quiet, Ordering::SeqCst);
    SHOW_RAW_JSON.store(ui.show_raw_json, Ordering::SeqCst);
    if !ui.color {
        colored::control::set_override(false);
    }
}

#[inline]
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

#[inline]
fn show_raw_json() -> bool {
    SHOW_RAW_JSON.load(Ordering::SeqCst)
}

/// Read a payload field for display, substituting `N/A` when the payload
/// is not an object, the key is absent, or the value is null.
pub fn field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn labelled(label: &str, value: String) -> String {
    format!("{} {}", format!("{}:", label).bright_blue(), value)
}

fn raw_json(payload: &Value) -> String {
    let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    format!("\n{}\n{}", "Raw JSON:".bright_magenta(), pretty)
}

/// Render a `/api/transaction` record.
pub fn render_transaction(event: &Event, with_raw: bool) -> String {
    let p = &event.payload;
    let mut lines = vec![
        separator(),
        format!("{}", "📚 TRANSACTION RECEIVED".bold().bright_cyan()),
        separator(),
    ];

    match event.classify() {
        EventKind::Borrow => {
            lines.push(format!("{} BORROW", "Action:".bright_green()));
            lines.push(labelled(
                "Student",
                format!("{} ({})", field(p, "student_name"), field(p, "student_grade")),
            ));
            lines.push(labelled("Book ID", field(p, "book_id")));
            lines.push(labelled("Borrow Date", field(p, "borrow_date")));
            lines.push(labelled("Due Date", field(p, "due_date")));
        }
        EventKind::Return => {
            lines.push(format!("{} RETURN", "Action:".bright_yellow()));
            lines.push(labelled("Book ID", field(p, "book_id")));
            lines.push(labelled("Return Date", field(p, "return_date")));
        }
        EventKind::AddBook | EventKind::Unknown => {
            lines.push(format!("{} UNKNOWN", "Action:".bright_red()));
        }
    }

    if with_raw {
        lines.push(raw_json(p));
    }
    lines.push(separator());
    lines.join("\n")
}

/// Render a `/api/book` record.
pub fn render_book(event: &Event, with_raw: bool) -> String {
    let p = &event.payload;
    let mut lines = vec![
        separator(),
        format!("{}", "📖 NEW BOOK RECEIVED".bold().bright_green()),
        separator(),
        labelled("Book ID", field(p, "book_id")),
        labelled("Title", field(p, "title")),
        labelled("Author", field(p, "author")),
        labelled("ISBN", field(p, "isbn")),
        labelled("Category", field(p, "category")),
        labelled("Added Date", field(p, "added_date")),
    ];
    if with_raw {
        lines.push(raw_json(p));
    }
    lines.push(separator());
    lines.join("\n")
}

pub fn render_banner(info: &ServerInfo, dashboard: bool) -> String {
    let mut lines = vec![
        format!("{}", separator().bold().bright_green()),
        format!("{}", "🚀 Digital Library Server Starting...".bold().bright_green()),
        format!("{}", separator().bold().bright_green()),
        format!(
            "{}",
            format!("Server running on: {}", info.urls.local).bright_cyan()
        ),
    ];
    if let Some(lan) = &info.urls.lan {
        lines.push(format!("{}", format!("On your network: {}", lan).bright_cyan()));
    }
    lines.push(format!(
        "{}",
        format!("For Android Emulator, use: {}", info.urls.emulator).yellow()
    ));
    if dashboard {
        lines.push(format!(
            "{}",
            format!("Dashboard: {}/dashboard", info.urls.local).bright_magenta()
        ));
    }
    lines.push(format!(
        "{}",
        format!("Keeping the latest {} records in memory", info.capacity).dimmed()
    ));
    lines.join("\n")
}

pub fn print_transaction(event: &Event) {
    if !is_quiet() {
        println!("{}\n", render_transaction(event, show_raw_json()));
    }
}

pub fn print_book(event: &Event) {
    if !is_quiet() {
        println!("{}\n", render_book(event, show_raw_json()));
    }
}

/// Rejections go to stderr even in quiet mode.
pub fn print_error(message: &str) {
    eprintln!("{}", format!("ERROR: {}", message).bright_red());
}

pub fn print_banner(info: &ServerInfo, dashboard: bool) {
    if !is_quiet() {
        println!("{}\n", render_banner(info, dashboard));
    }
}
