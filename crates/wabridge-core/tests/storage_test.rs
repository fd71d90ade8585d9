//! PostgreSQL repository tests.
//!
//! These run against the database named by `DATABASE_URL` and are ignored by
//! default. Run them with `cargo test -p wabridge-core -- --ignored`.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use sqlx::PgPool;
use wabridge_core::{
    storage::{schema, BridgeStorage, PostgresBridgeStorage},
    ChatId, ClientId, CoreError, NewClient,
};

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect to PostgreSQL");
    schema::create_tables(&pool).await.expect("create tables");
    pool
}

/// Chat id unique to this test run, so tests can share one database.
fn unique_chat_id(tag: &str) -> ChatId {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    ChatId::parse(&format!("{tag}{}@c.us", nanos % 1_000_000_000_000)).unwrap()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn schema_creation_is_idempotent() {
    let pool = connect().await;

    schema::create_tables(&pool).await.expect("second run succeeds");

    let tables = schema::list_tables(&pool).await.unwrap();
    assert!(tables.contains(&"clients".to_string()));
    assert!(tables.contains(&"notifications".to_string()));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn find_or_create_returns_same_client() {
    let storage = PostgresBridgeStorage::new(connect().await);
    let chat_id = unique_chat_id("a");

    let first = storage
        .find_or_create_client(NewClient::new(chat_id.clone()).with_name("Anna"), Utc::now())
        .await
        .unwrap();
    let second = storage.find_or_create_client(NewClient::new(chat_id), Utc::now()).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name.as_deref(), Some("Anna"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn concurrent_first_messages_create_one_client() {
    let storage = PostgresBridgeStorage::new(connect().await);
    let chat_id = unique_chat_id("b");

    let (a, b) = tokio::join!(
        storage.find_or_create_client(NewClient::new(chat_id.clone()), Utc::now()),
        storage.find_or_create_client(NewClient::new(chat_id.clone()), Utc::now()),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn notifications_are_listed_newest_first() {
    let storage = PostgresBridgeStorage::new(connect().await);
    let client = storage
        .find_or_create_client(NewClient::new(unique_chat_id("c")), Utc::now())
        .await
        .unwrap();

    let earlier = Utc::now() - chrono::Duration::minutes(5);
    storage.record_notification(client.id, "first".to_string(), earlier).await.unwrap();
    storage.record_notification(client.id, "second".to_string(), Utc::now()).await.unwrap();

    let history = storage.storage().notifications.find_by_client(client.id, 10).await.unwrap();
    let texts: Vec<_> = history.iter().map(|n| n.message_text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn notification_for_unknown_client_is_rejected() {
    let storage = PostgresBridgeStorage::new(connect().await);

    let result = storage.record_notification(ClientId(-1), "orphan".to_string(), Utc::now()).await;

    assert!(matches!(result, Err(CoreError::ConstraintViolation(_))));
}
