//! In-memory storage for testing relay logic without a database.
//!
//! Enforces the same invariants as the PostgreSQL schema: chat ids are
//! unique and notifications must reference an existing client. Supports
//! injecting a failure to simulate an unavailable database.

use std::{future::Future, pin::Pin, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::BridgeStorage;
use crate::{
    error::{CoreError, Result},
    models::{Client, ClientId, NewClient, Notification, NotificationId},
};

#[derive(Debug, Default)]
struct State {
    clients: Vec<Client>,
    notifications: Vec<Notification>,
    failure: Option<String>,
}

impl State {
    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(CoreError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

/// Mock storage holding clients and notifications in memory.
///
/// Clones share state, so a handle kept by a test observes every write the
/// application makes.
#[derive(Debug, Clone, Default)]
pub struct MockBridgeStorage {
    state: Arc<RwLock<State>>,
}

impl MockBridgeStorage {
    /// Creates a new mock storage with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with a database error.
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    /// Clears an injected failure.
    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Returns all clients in insertion order.
    pub async fn clients(&self) -> Vec<Client> {
        self.state.read().await.clients.clone()
    }

    /// Returns all notifications in insertion order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    /// Finds a client by chat identifier.
    pub async fn find_client(&self, chat_id: &str) -> Option<Client> {
        self.state.read().await.clients.iter().find(|c| c.chat_id == chat_id).cloned()
    }

    /// Returns the notifications recorded for one client, oldest first.
    pub async fn notifications_for(&self, client_id: ClientId) -> Vec<Notification> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.client_id == client_id)
            .cloned()
            .collect()
    }
}

impl BridgeStorage for MockBridgeStorage {
    fn find_or_create_client(
        &self,
        client: NewClient,
        created_at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Client>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            state.check_failure()?;

            if let Some(existing) =
                state.clients.iter().find(|c| c.chat_id == client.chat_id.as_str())
            {
                return Ok(existing.clone());
            }

            let id = i64::try_from(state.clients.len()).unwrap_or(i64::MAX - 1) + 1;
            let created = Client {
                id: ClientId(id),
                chat_id: client.chat_id.as_str().to_string(),
                name: client.name,
                created_at,
            };
            state.clients.push(created.clone());
            Ok(created)
        })
    }

    fn record_notification(
        &self,
        client_id: ClientId,
        message_text: String,
        timestamp: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Notification>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            state.check_failure()?;

            if !state.clients.iter().any(|c| c.id == client_id) {
                return Err(CoreError::ConstraintViolation(format!(
                    "foreign key constraint violation: client {client_id} does not exist"
                )));
            }

            let id = i64::try_from(state.notifications.len()).unwrap_or(i64::MAX - 1) + 1;
            let notification =
                Notification { id: NotificationId(id), client_id, message_text, timestamp };
            state.notifications.push(notification.clone());
            Ok(notification)
        })
    }

    fn health_check(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.state.read().await.check_failure() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatId;

    fn new_client(chat_id: &str) -> NewClient {
        NewClient::new(ChatId::parse(chat_id).unwrap())
    }

    #[tokio::test]
    async fn find_or_create_reuses_existing_client() {
        let storage = MockBridgeStorage::new();
        let now = Utc::now();

        let first = storage.find_or_create_client(new_client("1@c.us"), now).await.unwrap();
        let second = storage
            .find_or_create_client(new_client("1@c.us").with_name("Later Name"), now)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.name, None);
        assert_eq!(storage.clients().await.len(), 1);
    }

    #[tokio::test]
    async fn notification_requires_existing_client() {
        let storage = MockBridgeStorage::new();

        let result = storage.record_notification(ClientId(99), "hi".to_string(), Utc::now()).await;

        assert!(matches!(result, Err(CoreError::ConstraintViolation(_))));
        assert!(storage.notifications().await.is_empty());
    }

    #[tokio::test]
    async fn injected_failure_blocks_all_operations() {
        let storage = MockBridgeStorage::new();
        storage.fail_with("connection refused").await;

        assert!(storage.health_check().await.is_err());
        assert!(storage.find_or_create_client(new_client("1@c.us"), Utc::now()).await.is_err());

        storage.recover().await;
        assert!(storage.health_check().await.is_ok());
    }
}
