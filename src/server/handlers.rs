use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::errors::IngestError;
use crate::event_log::{Event, EventKind, Snapshot};
use crate::net::ServerInfo;
use crate::observability::telemetry;
use crate::output;

pub const TRANSACTION_ROUTE: &str = "/api/transaction";
pub const BOOK_ROUTE: &str = "/api/book";

/// Success acknowledgment for an ingest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    pub message: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl Ack {
    fn for_event(event: &Event, message: String) -> Self {
        Self {
            status: "success".to_string(),
            message,
            action: event.kind.clone(),
            timestamp: event.received_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfoResponse {
    #[serde(flatten)]
    pub info: ServerInfo,
    pub uptime_seconds: u64,
}

/// Parse a request body into a JSON value. Any JSON value is accepted.
pub fn decode_body(body: &[u8]) -> Result<Value, IngestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyBody);
    }
    Ok(serde_json::from_slice(body)?)
}

/// The `action` field when it is a string, otherwise `unknown`.
pub fn action_of(payload: &Value) -> String {
    payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or(EventKind::UNKNOWN)
        .to_string()
}

fn reject(route: &str, err: IngestError) -> IngestError {
    output::print_error(&err.to_string());
    telemetry::log_rejected(route, &err.to_string());
    err
}

pub async fn home() -> Json<Value> {
    Json(serde_json::json!({
        "status": "running",
        "message": "Digital Library Server is running",
        "endpoints": [
            "/api/transaction (POST)",
            "/api/book (POST)",
            "/api/transactions (GET)",
            "/api/server-info (GET)",
            "/health (GET)",
        ],
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        uptime_seconds: state.info.uptime_seconds(),
        info: (*state.info).clone(),
    })
}

pub async fn receive_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Ack>, IngestError> {
    let payload = decode_body(&body).map_err(|e| reject(TRANSACTION_ROUTE, e))?;
    let kind = action_of(&payload);

    let event = state.log.record(kind, payload);
    output::print_transaction(&event);
    telemetry::log_recorded(
        &event.kind,
        TRANSACTION_ROUTE,
        state.log.len(),
        state.log.capacity(),
    );

    let message = format!("Transaction ({}) received successfully", event.kind);
    Ok(Json(Ack::for_event(&event, message)))
}

pub async fn receive_book(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Ack>, IngestError> {
    let payload = decode_body(&body).map_err(|e| reject(BOOK_ROUTE, e))?;

    let event = state.log.record(EventKind::ADD_BOOK, payload);
    output::print_book(&event);
    telemetry::log_recorded(
        &event.kind,
        BOOK_ROUTE,
        state.log.len(),
        state.log.capacity(),
    );

    Ok(Json(Ack::for_event(
        &event,
        "Book added successfully".to_string(),
    )))
}

pub async fn list_transactions(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.log.snapshot())
}
