use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// The central error type for the bookdrop server.
///
/// Startup failures (config, bind) end the process with a matching exit
/// code; ingest failures are turned into HTTP responses and never escape
/// a request handler.
#[derive(Error, Debug)]
pub enum BookdropError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("Server stopped unexpectedly: {0}")]
    Serve(String),
}

/// Rejections produced while decoding an inbound record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Request body is empty")]
    EmptyBody,

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::MalformedJson(e.to_string())
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_BIND_ERROR: u8 = 3;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<BookdropError>() {
        return match err {
            BookdropError::Config(_) => EXIT_CONFIG_ERROR,
            BookdropError::Server(ServerError::Bind { .. }) => EXIT_BIND_ERROR,
            _ => EXIT_ERROR,
        };
    }

    if let Some(ServerError::Bind { .. }) = e.downcast_ref::<ServerError>() {
        return EXIT_BIND_ERROR;
    }

    EXIT_ERROR
}
