//! Static dashboard page and browser auto-launch.

use axum::response::Html;
use tracing::{debug, warn};

/// Self-contained page that polls `/api/transactions` and `/api/server-info`.
pub const DASHBOARD_HTML: &str = include_str!("dashboard.html");

pub async fn page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const NO_ARGS: &[&str] = &[];
const WINDOWS_START: &[&str] = &["/C", "start", ""];

fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", NO_ARGS)
    } else if cfg!(target_os = "windows") {
        ("cmd", WINDOWS_START)
    } else {
        ("xdg-open", NO_ARGS)
    }
}

/// Open `url` with the platform's default handler. Failures are logged and
/// otherwise ignored; the server keeps running without a browser.
pub async fn open_in_browser(url: &str) {
    let (program, args) = opener();
    let result = tokio::process::Command::new(program)
        .args(args)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    match result {
        Ok(status) if status.success() => debug!(url = url, "dashboard_opened"),
        Ok(status) => warn!(url = url, code = ?status.code(), "browser launcher exited with error"),
        Err(e) => warn!(url = url, error = %e, "failed to launch browser"),
    }
}
