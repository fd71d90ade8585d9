//! Table creation run at process startup.
//!
//! There is no migration history: tables and indexes are created if absent
//! and otherwise left alone.

use sqlx::PgPool;
use tracing::debug;

use crate::error::Result;

const CREATE_CLIENTS: &str = r"
    CREATE TABLE IF NOT EXISTS clients (
        id BIGSERIAL PRIMARY KEY,
        chat_id VARCHAR(50) NOT NULL UNIQUE,
        name VARCHAR(100),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
";

const CREATE_NOTIFICATIONS: &str = r"
    CREATE TABLE IF NOT EXISTS notifications (
        id BIGSERIAL PRIMARY KEY,
        client_id BIGINT NOT NULL REFERENCES clients(id),
        message_text TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
";

const CREATE_NOTIFICATIONS_CLIENT_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_notifications_client
    ON notifications(client_id, timestamp DESC)
";

/// Creates the `clients` and `notifications` tables if they do not exist.
///
/// # Errors
///
/// Returns `CoreError::Database` if any statement fails.
pub async fn create_tables(pool: &PgPool) -> Result<()> {
    for statement in [CREATE_CLIENTS, CREATE_NOTIFICATIONS, CREATE_NOTIFICATIONS_CLIENT_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }

    debug!("Schema is up to date");
    Ok(())
}

/// Lists the tables in the current schema.
///
/// # Errors
///
/// Returns error if query fails.
pub async fn list_tables(pool: &PgPool) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar(
        r"
        SELECT table_name::TEXT
        FROM information_schema.tables
        WHERE table_schema = current_schema()
        ORDER BY table_name
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(tables)
}
