//! Common test utilities for API testing with a mock tool runner.
//!
//! This module provides a test fixture that builds the real router around a
//! `MockToolRunner`, so batches run end to end without ffmpeg, 7-Zip or
//! LibreOffice installed.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use fileforge_core::{
    create_status_channel,
    testing::{fixtures::FakeTools, MockToolRunner},
    Config, Domain, StatusEnvelope,
};
use fileforge_server::api::{create_router, forward_status, StatusBroadcaster};
use fileforge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use fileforge_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new();
///     let input = fixture.input("clip.wav");
///
///     let response = fixture.post("/api/v1/convert/media", json!([
///         { "path": input, "targetFormat": "mp3" }
///     ])).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state, for driving cancellation directly
    pub state: Arc<AppState>,
    /// Mock tool runner - inspect invocations, inject failures
    pub runner: Arc<MockToolRunner>,
    /// Broadcaster the WebSocket handler reads from
    pub broadcaster: StatusBroadcaster,
    /// Directory for input files
    pub input_dir: PathBuf,
    /// Configured output folder (if any)
    pub output_dir: Option<PathBuf>,
    /// Temporary directory holding inputs and outputs
    pub temp_dir: TempDir,
    _forwarder: JoinHandle<()>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with an output folder and the default tool simulator.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input_dir = temp_dir.path().join("inputs");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        let (config, output_dir) = if test_config.without_output_folder {
            (Config::default(), None)
        } else {
            let output = temp_dir.path().join("converted");
            (fixtures::config_with_output(&output), Some(output))
        };

        let runner = Arc::new(MockToolRunner::with_handler(test_config.tools.handler()));

        let (status, status_rx) = create_status_channel(256);
        let broadcaster = StatusBroadcaster::new(256);
        let forwarder = tokio::spawn(forward_status(status_rx, broadcaster.clone()));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&runner) as Arc<dyn fileforge_core::ToolRunner>,
            status,
            broadcaster.clone(),
        ));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            runner,
            broadcaster,
            input_dir,
            output_dir,
            temp_dir,
            _forwarder: forwarder,
        }
    }

    /// Write an input file and return its path.
    pub fn input(&self, name: &str) -> PathBuf {
        fixtures::input_file(&self.input_dir, name, "input")
    }

    /// Output subdirectory for `domain`.
    pub fn output_path(&self, domain: Domain, name: &str) -> PathBuf {
        self.output_dir
            .as_ref()
            .expect("fixture has no output folder")
            .join(domain.output_subdir())
            .join(name)
    }

    /// Subscribe to status envelopes before starting a batch.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StatusEnvelope> {
        self.broadcaster.subscribe()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
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

    /// Fetch a plain-text body (e.g. `/metrics`).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Leave `output.folder` unset
    pub without_output_folder: bool,
    /// Archives known to the simulated 7-Zip
    pub tools: FakeTools,
}

impl TestConfig {
    /// Create config with no output folder.
    pub fn without_output_folder() -> Self {
        Self {
            without_output_folder: true,
            ..Default::default()
        }
    }

    /// Create config with the given tool simulator.
    pub fn with_tools(tools: FakeTools) -> Self {
        Self {
            tools,
            ..Default::default()
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
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
