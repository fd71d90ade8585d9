//! Repository for client database operations.
//!
//! Clients are created on first sight and never updated or deleted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::{
    error::Result,
    models::{Client, NewClient},
};

/// Repository for client database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Finds a client by its gateway chat identifier.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_by_chat_id(&self, chat_id: &str) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r"
            SELECT id, chat_id, name, created_at
            FROM clients
            WHERE chat_id = $1
            ",
        )
        .bind(chat_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(client)
    }

    /// Returns the client for `client.chat_id`, inserting it if absent.
    ///
    /// Concurrent first messages for the same chat race on the unique
    /// constraint; the loser re-reads the winner's row.
    ///
    /// # Errors
    ///
    /// Returns error if any query fails.
    pub async fn find_or_create(
        &self,
        client: &NewClient,
        created_at: DateTime<Utc>,
    ) -> Result<Client> {
        if let Some(existing) = self.find_by_chat_id(client.chat_id.as_str()).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query_as::<_, Client>(
            r"
            INSERT INTO clients (chat_id, name, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (chat_id) DO NOTHING
            RETURNING id, chat_id, name, created_at
            ",
        )
        .bind(client.chat_id.as_str())
        .bind(client.name.as_deref())
        .bind(created_at)
        .fetch_optional(&*self.pool)
        .await?;

        if let Some(created) = inserted {
            debug!(client_id = %created.id, chat_id = %created.chat_id, "Created client");
            return Ok(created);
        }

        let existing = sqlx::query_as::<_, Client>(
            r"
            SELECT id, chat_id, name, created_at
            FROM clients
            WHERE chat_id = $1
            ",
        )
        .bind(client.chat_id.as_str())
        .fetch_one(&*self.pool)
        .await?;

        Ok(existing)
    }

    /// Counts all clients.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM clients").fetch_one(&*self.pool).await?;

        Ok(count.0)
    }
}
