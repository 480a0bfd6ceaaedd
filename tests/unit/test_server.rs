//! Router tests
//!
//! Requests are driven through the axum router with `oneshot`, so no port
//! is bound. Tests cover:
//! - Ingest calls (transaction and book)
//! - Rejection of malformed bodies
//! - Query call ordering and count
//! - Metadata routes and dashboard toggle

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bookdrop::config::UiConfig;
use bookdrop::event_log::EventLog;
use bookdrop::net::ServerInfo;
use bookdrop::observability::telemetry::VERBOSE_FILTER;
use bookdrop::output;
use bookdrop::server::{router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

fn quiet() {
    output::init(&UiConfig {
        color: false,
        show_raw_json: false,
        quiet: true,
    });
}

fn app_with(capacity: usize, dashboard: bool) -> (Router, Arc<EventLog>) {
    quiet();
    let log = Arc::new(EventLog::new(capacity).unwrap());
    let info = ServerInfo::new("0.0.0.0", 8080, None, capacity);
    let app = router(AppState::new(Arc::clone(&log), info), dashboard);
    (app, log)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Ingest Tests
// ============================================================================

mod ingest_tests {
    use super::*;

    #[tokio::test]
    async fn test_borrow_transaction_acknowledged() {
        let (app, log) = app_with(50, true);
        let (status, body) = send(
            &app,
            post(
                "/api/transaction",
                r#"{"action":"borrow","student_name":"Ana","book_id":"B1"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["action"], "borrow");
        assert_eq!(body["message"], "Transaction (borrow) received successfully");
        assert!(body["timestamp"].is_string());
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_action_stored_as_unknown() {
        let (app, log) = app_with(50, true);
        let (status, body) = send(&app, post("/api/transaction", r#"{"book_id":"B1"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "unknown");
        assert_eq!(log.snapshot().transactions[0].kind, "unknown");
    }

    #[tokio::test]
    async fn test_unrecognized_action_stored_literally() {
        let (app, log) = app_with(50, true);
        send(&app, post("/api/transaction", r#"{"action":"renew"}"#)).await;
        assert_eq!(log.snapshot().transactions[0].kind, "renew");
    }

    #[tokio::test]
    async fn test_book_route_uses_add_book() {
        let (app, log) = app_with(50, true);
        let (status, body) = send(
            &app,
            post("/api/book", r#"{"action":"borrow","title":"Dune"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "add_book");
        assert_eq!(body["message"], "Book added successfully");

        let event = &log.snapshot().transactions[0];
        assert_eq!(event.kind, "add_book");
        assert_eq!(event.payload, json!({"action": "borrow", "title": "Dune"}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (app, log) = app_with(50, true);
        let (status, body) = send(&app, post("/api/transaction", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("Malformed JSON"));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let (app, log) = app_with(50, true);
        let (status, body) = send(&app, post("/api/book", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request body is empty");
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_body_accepted() {
        let (app, log) = app_with(50, true);
        let (status, _) = send(&app, post("/api/transaction", "[1,2,3]")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(log.snapshot().transactions[0].payload, json!([1, 2, 3]));
    }
}

// ============================================================================
// Query Tests
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_query() {
        let (app, _) = app_with(50, true);
        let (status, body) = send(&app, get("/api/transactions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"transactions": [], "count": 0}));
    }

    #[tokio::test]
    async fn test_query_is_newest_first_and_bounded() {
        let (app, _) = app_with(3, true);
        send(&app, post("/api/transaction", r#"{"action":"borrow","n":1}"#)).await;
        send(&app, post("/api/transaction", r#"{"action":"return","n":2}"#)).await;
        send(&app, post("/api/book", r#"{"title":"Dune","n":3}"#)).await;
        send(&app, post("/api/transaction", r#"{"action":"borrow","n":4}"#)).await;

        let (_, body) = send(&app, get("/api/transactions")).await;
        assert_eq!(body["count"], 3);
        let actions: Vec<&str> = body["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["borrow", "add_book", "return"]);
        assert_eq!(body["transactions"][0]["data"]["n"], 4);
        assert!(body["transactions"][0]["timestamp"].is_string());
    }
}

// ============================================================================
// Metadata Tests
// ============================================================================

mod metadata_tests {
    use super::*;

    #[tokio::test]
    async fn test_home() {
        let (app, _) = app_with(50, true);
        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert!(body["endpoints"]
            .as_array()
            .unwrap()
            .contains(&json!("/health (GET)")));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(50, true);
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_server_info() {
        let (app, _) = app_with(7, true);
        let (status, body) = send(&app, get("/api/server-info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["port"], 8080);
        assert_eq!(body["capacity"], 7);
        assert_eq!(body["urls"]["emulator"], "http://10.0.2.2:8080");
        assert!(body["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn test_dashboard_served_when_enabled() {
        let (app, _) = app_with(50, true);
        let resp = app.oneshot(get("/dashboard")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_dashboard_absent_when_disabled() {
        let (app, _) = app_with(50, false);
        let resp = app.oneshot(get("/dashboard")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (app, _) = app_with(50, true);
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://10.0.2.2")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}

// ============================================================================
// Request Logging Tests
// ============================================================================

mod request_logging_tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_verbose_filter_shows_request_log() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(VERBOSE_FILTER))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (app, _) = app_with(50, true);
        let (status, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);

        let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("finished processing request"), "{}", logged);
        assert!(logged.contains("/health"), "{}", logged);
    }
}
