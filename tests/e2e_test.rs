//! End-to-end tests for complete conversations through the bridge.
//!
//! The in-memory tests run everywhere. The PostgreSQL test drives the real
//! repositories and is ignored unless a database is available.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wabridge_api::{
    create_router,
    replies::{ACKNOWLEDGEMENT_REPLY, GREETING_REPLY},
    AppState,
};
use wabridge_core::RealClock;
use wabridge_gateway::{GatewayClient, GatewayConfig};
use wabridge_testing::{
    unique_chat_id, GatewayMock, TestDatabase, TestEnv, WebhookBuilder, TEST_API_TOKEN,
    TEST_INSTANCE_ID,
};

const CHAT: &str = "79001234567@c.us";

#[tokio::test]
async fn conversation_round_trip() {
    let env = TestEnv::new().await.unwrap();

    // customer greets, operator follows up, gateway reports delivery status
    let greeting = WebhookBuilder::incoming(CHAT, "Привет").sender_name("Анна").build();
    assert_eq!(env.post_json("/webhook", &greeting).await.unwrap().status, StatusCode::OK);

    env.advance_time(Duration::from_secs(30));
    let follow_up = json!({"chat_id": CHAT, "message_text": "Ваш заказ готов"});
    assert_eq!(env.post_json("/send_message", &follow_up).await.unwrap().status, StatusCode::OK);

    let status = WebhookBuilder::of_type("outgoingMessageStatus").build();
    assert_eq!(env.post_json("/webhook", &status).await.unwrap().status, StatusCode::OK);

    env.advance_time(Duration::from_secs(30));
    let thanks = WebhookBuilder::incoming(CHAT, "спасибо").build();
    assert_eq!(env.post_json("/webhook", &thanks).await.unwrap().status, StatusCode::OK);

    let clients = env.storage.clients().await;
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name.as_deref(), Some("Анна"));

    let history: Vec<_> = env
        .storage
        .notifications_for(clients[0].id)
        .await
        .into_iter()
        .map(|n| n.message_text)
        .collect();
    assert_eq!(history, ["Привет", "Ваш заказ готов", "спасибо"]);

    let sent: Vec<_> =
        env.gateway.sent_messages().await.into_iter().map(|m| m.message).collect();
    assert_eq!(sent, [GREETING_REPLY, "Ваш заказ готов", ACKNOWLEDGEMENT_REPLY]);

    env.check_invariants().await.unwrap();
}

#[tokio::test]
async fn many_chats_stay_separate() {
    let env = TestEnv::new().await.unwrap();

    for i in 0..5 {
        let chat = format!("7900000000{i}@c.us");
        env.post_json("/webhook", &WebhookBuilder::incoming(chat.as_str(), "hi").build())
            .await
            .unwrap();
        env.post_json("/send_message", &json!({"chat_id": chat, "message_text": "reply"}))
            .await
            .unwrap();
    }

    let clients = env.storage.clients().await;
    assert_eq!(clients.len(), 5);
    for client in &clients {
        assert_eq!(env.storage.notifications_for(client.id).await.len(), 2);
    }
    env.check_invariants().await.unwrap();
}

#[tokio::test]
async fn outage_then_recovery() {
    let env = TestEnv::new().await.unwrap();

    env.storage.fail_with("connection reset").await;
    let response = env.post_json("/webhook", &WebhookBuilder::incoming(CHAT, "hi").build()).await;
    assert_eq!(response.unwrap().status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(env.get("/health").await.unwrap().status, StatusCode::SERVICE_UNAVAILABLE);

    env.storage.recover().await;
    let response = env.post_json("/webhook", &WebhookBuilder::incoming(CHAT, "hi").build()).await;
    assert_eq!(response.unwrap().status, StatusCode::OK);
    assert_eq!(env.get("/health").await.unwrap().status, StatusCode::OK);

    assert_eq!(env.storage.notifications().await.len(), 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn postgres_conversation_round_trip() {
    let db = TestDatabase::new().await.unwrap();
    let gateway = GatewayMock::start().await;
    gateway.accept_messages().await;

    let config =
        GatewayConfig::new(TEST_INSTANCE_ID, TEST_API_TOKEN).with_api_url(gateway.url());
    let state = AppState::new(
        Arc::new(db.storage()),
        GatewayClient::new(config).unwrap(),
        Arc::new(RealClock::new()),
    );
    let router = create_router(state, Duration::from_secs(30));
    let chat_id = unique_chat_id();

    let webhook = WebhookBuilder::incoming(chat_id.as_str(), "привет").build();
    let send = json!({"chat_id": chat_id.as_str(), "message_text": "hello"});
    for (path, body) in [("/webhook", webhook), ("/send_message", send)] {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    assert_eq!(db.count_notifications(&chat_id).await.unwrap(), 2);
    gateway.assert_sent_count(2).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    assert_eq!(router.oneshot(request).await.unwrap().status(), StatusCode::OK);
}
