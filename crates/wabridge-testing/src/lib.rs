//! Test infrastructure for the wabridge workspace.
//!
//! [`TestEnv`] wires the real router to in-memory storage, a deterministic
//! clock, and a mock gateway, so request-level tests run without PostgreSQL
//! or network access. [`database::TestDatabase`] covers the tests that need
//! the real schema.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{body::Body, Router};
use http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;
use wabridge_api::{create_router, AppState};
use wabridge_gateway::{GatewayClient, GatewayConfig};

pub mod database;
pub mod fixtures;
pub mod gateway;
pub mod invariants;

pub use database::{unique_chat_id, TestDatabase};
pub use fixtures::WebhookBuilder;
pub use gateway::{GatewayMock, TEST_API_TOKEN, TEST_INSTANCE_ID};
pub use invariants::Invariants;
pub use wabridge_core::{storage::mock::MockBridgeStorage, Clock, TestClock};

/// Gateway timeout used by test environments.
pub const TEST_GATEWAY_TIMEOUT: Duration = Duration::from_secs(2);

/// Application wired to in-memory collaborators.
pub struct TestEnv {
    /// Mock gateway receiving outbound messages
    pub gateway: GatewayMock,
    /// Storage shared with the application
    pub storage: MockBridgeStorage,
    /// Deterministic clock shared with the application
    pub clock: TestClock,
    router: Router,
}

impl TestEnv {
    /// Creates an environment whose gateway accepts every message.
    pub async fn new() -> Result<Self> {
        let env = Self::with_gateway_timeout(TEST_GATEWAY_TIMEOUT).await?;
        env.gateway.accept_messages().await;
        Ok(env)
    }

    /// Creates an environment with no gateway behaviour mounted.
    ///
    /// Requests to the gateway get wiremock's default 404 until the test
    /// mounts a response.
    pub async fn without_gateway_responses() -> Result<Self> {
        Self::with_gateway_timeout(TEST_GATEWAY_TIMEOUT).await
    }

    /// Creates an environment with a custom gateway timeout.
    pub async fn with_gateway_timeout(timeout: Duration) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,wabridge=debug")),
            )
            .with_test_writer()
            .try_init();

        let gateway = GatewayMock::start().await;
        let storage = MockBridgeStorage::new();
        let clock = TestClock::new();

        let gateway_config = GatewayConfig::new(TEST_INSTANCE_ID, TEST_API_TOKEN)
            .with_api_url(gateway.url())
            .with_timeout(timeout);
        let gateway_client =
            GatewayClient::new(gateway_config).context("Failed to build gateway client")?;

        let state =
            AppState::new(Arc::new(storage.clone()), gateway_client, Arc::new(clock.clone()));
        let router = create_router(state, Duration::from_secs(30));

        Ok(Self { gateway, storage, clock, router })
    }

    /// Returns a clone of the application router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Advances test time by the specified duration.
    pub fn advance_time(&self, duration: Duration) {
        self.clock.advance(duration);
    }

    /// Sends a JSON body with `POST`.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<TestResponse> {
        self.post_raw(path, body.to_string(), "application/json").await
    }

    /// Sends a raw body with `POST` and the given content type.
    pub async fn post_raw(
        &self,
        path: &str,
        body: impl Into<String>,
        content_type: &str,
    ) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.into()))
            .context("Failed to build request")?;
        self.send(request).await
    }

    /// Sends a `GET` request.
    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .context("Failed to build request")?;
        self.send(request).await
    }

    /// Sends an arbitrary request through the router.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("Router failed")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("Failed to read response body")?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(TestResponse { status, headers, body })
    }

    /// Checks the store invariants against the current mock state.
    pub async fn check_invariants(&self) -> Result<()> {
        let clients = self.storage.clients().await;
        let notifications = self.storage.notifications().await;
        Invariants::check_all(&clients, &notifications)
    }
}

/// Buffered response from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body parsed as JSON, or `Null` if it was not JSON
    pub body: Value,
}

impl TestResponse {
    /// Error code of an error response, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.body.pointer("/error/code").and_then(Value::as_str)
    }
}
