//! Integration tests for the gateway client.
//!
//! Runs the client against a wiremock server standing in for the gateway.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::json;
use wabridge_gateway::{GatewayClient, GatewayConfig, GatewayError};
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const INSTANCE_ID: &str = "1101000001";
const API_TOKEN: &str = "test-token";
const SEND_PATH: &str = "/waInstance1101000001/sendMessage/test-token";

fn client_for(server: &MockServer) -> GatewayClient {
    let config = GatewayConfig::new(INSTANCE_ID, API_TOKEN).with_api_url(server.uri());
    GatewayClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn sends_message_and_returns_gateway_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_json(json!({"chatId": "79001234567@c.us", "message": "Hello"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"idMessage": "BAE5F4886F6F2D05"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .send_message("79001234567@c.us", "Hello")
        .await
        .expect("Send should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, json!({"idMessage": "BAE5F4886F6F2D05"}));
}

#[tokio::test]
async fn json_error_body_is_returned_to_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(466).set_body_json(json!({"message": "quota exceeded"})))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .send_message("79001234567@c.us", "Hello")
        .await
        .expect("JSON error body should be returned");

    assert_eq!(response.status_code, 466);
    assert!(!response.is_success());
    assert_eq!(response.body, json!({"message": "quota exceeded"}));
}

#[tokio::test]
async fn non_success_status_without_json_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client_for(&server).send_message("79001234567@c.us", "Hello").await;

    match result {
        Err(GatewayError::Rejected { status_code, body }) => {
            assert_eq!(status_code, 401);
            assert_eq!(body, "Unauthorized");
        },
        other => panic!("Expected rejection, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).send_message("79001234567@c.us", "Hello").await;

    assert!(matches!(result, Err(GatewayError::InvalidResponse { .. })));
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"idMessage": "late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = GatewayConfig::new(INSTANCE_ID, API_TOKEN)
        .with_api_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let client = GatewayClient::new(config).unwrap();

    let result = client.send_message("79001234567@c.us", "Hello").await;

    assert!(matches!(result, Err(GatewayError::Timeout { .. })), "got {result:?}");
}

#[tokio::test]
async fn unreachable_gateway_is_network_error() {
    // Port 9 (discard) is closed on test hosts
    let config = GatewayConfig::new(INSTANCE_ID, API_TOKEN)
        .with_api_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(5));
    let client = GatewayClient::new(config).unwrap();

    let result = client.send_message("79001234567@c.us", "Hello").await;

    match result {
        Err(GatewayError::Network { message }) => {
            assert!(!message.contains(API_TOKEN), "token leaked into error: {message}");
        },
        other => panic!("Expected network error, got: {other:?}"),
    }
}
