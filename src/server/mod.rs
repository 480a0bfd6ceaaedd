//! HTTP layer
//!
//! Routes:
//! - `POST /api/transaction`, `POST /api/book`: ingest calls
//! - `GET /api/transactions`: query call for the dashboard
//! - `GET /`, `/health`, `/api/server-info`: service metadata
//! - `GET /dashboard`: static page, only when enabled
//!
//! The event log is injected as router state; handlers never reach for a
//! global.

pub mod dashboard;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::config::Config;
use crate::errors::ServerError;
use crate::event_log::EventLog;
use crate::net::{self, ServerInfo};
use crate::output;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub log: Arc<EventLog>,
    pub info: Arc<ServerInfo>,
}

impl AppState {
    pub fn new(log: Arc<EventLog>, info: ServerInfo) -> Self {
        Self {
            log,
            info: Arc::new(info),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, dashboard_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/api/server-info", get(handlers::server_info))
        .route("/api/transaction", post(handlers::receive_transaction))
        .route("/api/book", post(handlers::receive_book))
        .route("/api/transactions", get(handlers::list_transactions));

    if dashboard_enabled {
        app = app.route("/dashboard", get(dashboard::page));
    }

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    app.layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind, print the banner and serve until `shutdown` resolves.
pub async fn serve<F>(config: &Config, log: Arc<EventLog>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.clone(),
            message: e.to_string(),
        })?;

    // Port 0 binds an ephemeral port; report the real one.
    let port = listener
        .local_addr()
        .map(|a| a.port())
        .unwrap_or(config.server.port);

    let info = ServerInfo::new(&config.server.host, port, net::lan_ip(), log.capacity());
    output::print_banner(&info, config.dashboard.enabled);
    info!(addr = %addr, port = port, capacity = log.capacity(), "server_listening");

    if config.dashboard.enabled && config.dashboard.open_browser {
        let url = format!("{}/dashboard", info.urls.local);
        tokio::spawn(async move { dashboard::open_in_browser(&url).await });
    }

    let app = router(AppState::new(log, info), config.dashboard.enabled);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    info!("server_stopped");
    Ok(())
}
