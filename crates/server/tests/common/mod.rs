//! Common test utilities for E2E testing.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a temporary template directory, enabling end-to-end testing
//! of the HTTP surface without binding a port.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use ticketpress_core::{
    BatchConfig, Config, ProgressConfig, ProgressStore, ServerConfig, TemplatesConfig,
    TicketConfig,
};

/// Re-export fixtures for test convenience
pub use ticketpress_core::testing::fixtures;

/// Template edge lengths used by every fixture.
pub const TEMPLATE_WIDTH: u32 = 200;
pub const TEMPLATE_HEIGHT: u32 = 120;

/// Test fixture for E2E testing.
///
/// The template directory holds `ticket.png` (default) and
/// `ticket_VIP.png`. The `NV` zone is mapped to a file that does not exist.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_render() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/tickets/render", json!({
///         "payload": "TICKET-0001"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Progress store shared with the batch controller
    pub progress: ProgressStore,
    /// Cancelled to simulate server shutdown
    pub shutdown: CancellationToken,
    /// Temporary template directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    /// Parsed JSON body, `Null` for empty or non-JSON bodies
    pub body: Value,
}

impl TestResponse {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with the default test configuration.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test fixture, letting the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fixtures::write_template(temp_dir.path(), "ticket.png", TEMPLATE_WIDTH, TEMPLATE_HEIGHT);
        fixtures::write_template(
            temp_dir.path(),
            "ticket_VIP.png",
            TEMPLATE_WIDTH,
            TEMPLATE_HEIGHT,
        );

        let zones = HashMap::from([
            ("VIP".to_string(), "ticket_VIP.png".to_string()),
            ("NV".to_string(), "ticket_NV.png".to_string()),
        ]);

        let mut config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            templates: TemplatesConfig {
                dir: temp_dir.path().to_path_buf(),
                cache: true,
                zones,
            },
            ticket: TicketConfig {
                template_id: "ticket.png".to_string(),
                ..TicketConfig::default()
            }
            .with_qr_size(60)
            .with_qr_position(120, 30),
            batch: BatchConfig::default()
                .with_wave_size(2)
                .with_cooldown_ms(0)
                .with_ticket_timeout_secs(10),
            progress: ProgressConfig::default(),
        };
        adjust(&mut config);

        let progress = ProgressStore::new(config.progress.clone());
        let shutdown = CancellationToken::new();
        let state = Arc::new(ticketpress_server::state::AppState::new(
            config,
            progress.clone(),
            shutdown.clone(),
        ));

        // Create router
        let router = ticketpress_server::api::create_router(state);

        Self {
            router,
            progress,
            shutdown,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a PUT request without a body.
    pub async fn put_empty(&self, path: &str) -> TestResponse {
        self.request("PUT", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            String::from_utf8_lossy(&$response.bytes)
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
