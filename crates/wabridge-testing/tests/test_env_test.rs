//! Tests for the test infrastructure itself.

use std::time::Duration;

use chrono::Utc;
use wabridge_core::{Client, ClientId, Notification, NotificationId};
use wabridge_gateway::{GatewayClient, GatewayConfig};
use wabridge_testing::{
    Clock, GatewayMock, Invariants, TestEnv, WebhookBuilder, TEST_API_TOKEN, TEST_INSTANCE_ID,
};

fn client(id: i64, chat_id: &str) -> Client {
    Client { id: ClientId(id), chat_id: chat_id.to_string(), name: None, created_at: Utc::now() }
}

fn notification(id: i64, client_id: i64) -> Notification {
    Notification {
        id: NotificationId(id),
        client_id: ClientId(client_id),
        message_text: "x".to_string(),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn environment_starts_empty() {
    let env = TestEnv::new().await.unwrap();

    assert!(env.storage.clients().await.is_empty());
    assert!(!env.gateway.url().is_empty());
    env.gateway.assert_sent_count(0).await;
}

#[tokio::test]
async fn clock_is_shared_with_the_application() {
    let env = TestEnv::new().await.unwrap();
    let start = env.clock.now();

    env.advance_time(Duration::from_secs(60));

    assert_eq!(env.clock.now().duration_since(start), Duration::from_secs(60));
}

#[tokio::test]
async fn gateway_mock_records_send_requests() {
    let gateway = GatewayMock::start().await;
    gateway.accept_messages().await;
    let config = GatewayConfig::new(TEST_INSTANCE_ID, TEST_API_TOKEN).with_api_url(gateway.url());
    let client = GatewayClient::new(config).unwrap();

    let response = client.send_message("1@c.us", "m").await.unwrap();

    assert_eq!(response.status_code, 200);
    let sent = gateway.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, "1@c.us");
    assert_eq!(sent[0].message, "m");
}

#[test]
fn webhook_builder_produces_gateway_shape() {
    let payload = WebhookBuilder::incoming("1@c.us", "hi").sender_name("Anna").build();

    assert_eq!(payload["typeWebhook"], "incomingMessageReceived");
    assert_eq!(payload["senderData"]["chatId"], "1@c.us");
    assert_eq!(payload["senderData"]["senderName"], "Anna");
    assert_eq!(payload["messageData"]["textMessageData"]["textMessage"], "hi");
}

#[test]
fn webhook_builder_can_drop_fields() {
    let payload = WebhookBuilder::incoming("1@c.us", "hi")
        .without_type()
        .without_chat_id()
        .without_message_data()
        .build();

    assert!(payload.get("typeWebhook").is_none());
    assert!(payload["senderData"].get("chatId").is_none());
    assert!(payload.get("messageData").is_none());
}

#[test]
fn invariants_detect_duplicate_chat_ids() {
    let clients = vec![client(1, "a@c.us"), client(2, "a@c.us")];

    assert!(Invariants::unique_chat_ids(&clients).is_err());
}

#[test]
fn invariants_detect_orphan_notifications() {
    let clients = vec![client(1, "a@c.us")];

    assert!(Invariants::notifications_reference_clients(&clients, &[notification(1, 1)]).is_ok());
    assert!(Invariants::notifications_reference_clients(&clients, &[notification(2, 7)]).is_err());
}

#[test]
fn invariants_detect_overlong_values() {
    let mut wide = client(1, "a@c.us");
    wide.name = Some("n".repeat(101));

    assert!(Invariants::column_widths(&[wide]).is_err());
    assert!(Invariants::check_all(&[client(1, "a@c.us")], &[]).is_ok());
}
