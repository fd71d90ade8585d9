//! Repository for notification history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{ClientId, Notification},
};

/// Repository for notification database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Records one message for a client.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConstraintViolation` if the client does not exist,
    /// or a database error if the insert fails.
    pub async fn create(
        &self,
        client_id: ClientId,
        message_text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notifications (client_id, message_text, timestamp)
            VALUES ($1, $2, $3)
            RETURNING id, client_id, message_text, timestamp
            ",
        )
        .bind(client_id)
        .bind(message_text)
        .bind(timestamp)
        .fetch_one(&*self.pool)
        .await?;

        Ok(notification)
    }

    /// Returns the most recent notifications for a client, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_by_client(&self, client_id: ClientId, limit: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r"
            SELECT id, client_id, message_text, timestamp
            FROM notifications
            WHERE client_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(notifications)
    }

    /// Counts all notifications.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications").fetch_one(&*self.pool).await?;

        Ok(count.0)
    }
}
