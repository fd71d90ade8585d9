//! Database access layer for clients and notifications.
//!
//! [`Storage`] groups the PostgreSQL repositories behind one shared pool.
//! The HTTP layer does not use it directly: it talks to the
//! [`BridgeStorage`] trait, implemented here for PostgreSQL and in
//! [`mock`] for in-memory tests.

use std::{future::Future, pin::Pin, sync::Arc};

use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub mod clients;
pub mod mock;
pub mod notifications;
pub mod schema;

use crate::{
    error::Result,
    models::{Client, ClientId, NewClient, Notification},
};

/// Container for all repository instances providing unified database access.
#[derive(Clone)]
pub struct Storage {
    /// Repository for client records.
    pub clients: Arc<clients::Repository>,

    /// Repository for notification history.
    pub notifications: Arc<notifications::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self {
            clients: Arc::new(clients::Repository::new(pool.clone())),
            notifications: Arc::new(notifications::Repository::new(pool)),
        }
    }

    /// Performs a health check on the database connection.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.clients.pool()).await?;

        Ok(())
    }
}

/// Storage operations required by the relay.
///
/// Implementations must uphold two invariants: a chat id maps to at most one
/// client, and a notification is only recorded for a client that already
/// exists.
pub trait BridgeStorage: Send + Sync + 'static {
    /// Returns the client for `client.chat_id`, creating it if absent.
    ///
    /// An existing client is returned unchanged; the name and timestamp of
    /// `client` only apply when a new row is created.
    fn find_or_create_client(
        &self,
        client: NewClient,
        created_at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Client>> + Send + '_>>;

    /// Records one message for an existing client.
    fn record_notification(
        &self,
        client_id: ClientId,
        message_text: String,
        timestamp: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Notification>> + Send + '_>>;

    /// Verifies the backing store is reachable.
    fn health_check(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production storage implementation using PostgreSQL.
#[derive(Clone)]
pub struct PostgresBridgeStorage {
    storage: Storage,
}

impl PostgresBridgeStorage {
    /// Creates a new PostgreSQL storage adapter.
    pub fn new(pool: PgPool) -> Self {
        Self { storage: Storage::new(pool) }
    }

    /// Returns the underlying repositories.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl BridgeStorage for PostgresBridgeStorage {
    fn find_or_create_client(
        &self,
        client: NewClient,
        created_at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Client>> + Send + '_>> {
        Box::pin(async move { self.storage.clients.find_or_create(&client, created_at).await })
    }

    fn record_notification(
        &self,
        client_id: ClientId,
        message_text: String,
        timestamp: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Notification>> + Send + '_>> {
        Box::pin(async move {
            self.storage.notifications.create(client_id, &message_text, timestamp).await
        })
    }

    fn health_check(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.storage.health_check())
    }
}
