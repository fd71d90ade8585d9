//! Mock of the messaging gateway's HTTP API.

use std::time::Duration;

use serde_json::{json, Value};
use wabridge_gateway::SendMessageRequest;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Instance id the test environment configures its gateway client with.
pub const TEST_INSTANCE_ID: &str = "1101000001";

/// API token the test environment configures its gateway client with.
pub const TEST_API_TOKEN: &str = "test-token-0123456789abcdef";

/// Gateway stand-in serving `sendMessage` for the test instance.
pub struct GatewayMock {
    server: MockServer,
}

impl GatewayMock {
    /// Starts a new mock gateway on a random port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Returns the base URL to configure the gateway client with.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Path of the `sendMessage` method for the test instance.
    pub fn send_message_path() -> String {
        format!("/waInstance{TEST_INSTANCE_ID}/sendMessage/{TEST_API_TOKEN}")
    }

    /// Accepts every message with a generated `idMessage`.
    pub async fn accept_messages(&self) {
        self.respond_with_json(200, json!({ "idMessage": "3EB0C767D097B7C7C030" })).await;
    }

    /// Answers every message with the given status and JSON body.
    pub async fn respond_with_json(&self, status: u16, body: Value) {
        self.mount(ResponseTemplate::new(status).set_body_json(body)).await;
    }

    /// Answers every message with the given status and raw body.
    pub async fn respond_with_raw(&self, status: u16, body: &str) {
        self.mount(ResponseTemplate::new(status).set_body_string(body)).await;
    }

    /// Accepts messages only after the given delay.
    pub async fn respond_after(&self, delay: Duration) {
        self.mount(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "idMessage": "delayed" }))
                .set_delay(delay),
        )
        .await;
    }

    /// Answers every message with the given status and a JSON error body.
    pub async fn reject_messages(&self, status: u16) {
        self.respond_with_json(status, json!({ "message": "rejected by mock gateway" })).await;
    }

    /// Returns the `sendMessage` bodies received so far, in order.
    pub async fn sent_messages(&self) -> Vec<SendMessageRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == Self::send_message_path())
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Asserts that exactly `expected` messages were sent.
    pub async fn assert_sent_count(&self, expected: usize) {
        let sent = self.sent_messages().await;
        assert_eq!(
            sent.len(),
            expected,
            "Expected {} messages sent to the gateway, received {}: {:?}",
            expected,
            sent.len(),
            sent
        );
    }

    async fn mount(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(Self::send_message_path()))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }
}
