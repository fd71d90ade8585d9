//! Domain models and strongly-typed identifiers.
//!
//! A [`Client`] is one external chat participant, keyed by the gateway's chat
//! identifier. A [`Notification`] is one message seen for that client. Both
//! are append-only: clients are created on first sight and never updated,
//! notifications are never updated or deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    std::result::Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Maximum length of a chat identifier, matching the `clients.chat_id` column.
pub const MAX_CHAT_ID_LEN: usize = 50;

/// Maximum length of a client display name, matching `clients.name`.
pub const MAX_CLIENT_NAME_LEN: usize = 100;

/// Strongly-typed client identifier.
///
/// Surrogate key assigned by the database. Notifications reference clients
/// through this key, never through the chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub i64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl sqlx::Type<PgDb> for ClientId {
    fn type_info() -> PgTypeInfo {
        <i64 as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for ClientId {
    fn decode(value: PgValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let id = <i64 as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(id))
    }
}

impl sqlx::Encode<'_, PgDb> for ClientId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <i64 as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Strongly-typed notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub i64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NotificationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl sqlx::Type<PgDb> for NotificationId {
    fn type_info() -> PgTypeInfo {
        <i64 as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for NotificationId {
    fn decode(value: PgValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let id = <i64 as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(id))
    }
}

impl sqlx::Encode<'_, PgDb> for NotificationId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <i64 as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Validated gateway chat identifier, e.g. `79001234567@c.us`.
///
/// # Example
///
/// ```
/// use wabridge_core::models::ChatId;
///
/// let chat_id = ChatId::parse(" 79001234567@c.us ").unwrap();
/// assert_eq!(chat_id.as_str(), "79001234567@c.us");
/// assert!(ChatId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Parses a chat identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if the identifier is empty or longer
    /// than [`MAX_CHAT_ID_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput("chat id must not be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_CHAT_ID_LEN {
            return Err(CoreError::InvalidInput(format!(
                "chat id exceeds {MAX_CHAT_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One external chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    /// Surrogate key.
    pub id: ClientId,
    /// Gateway chat identifier, unique across the store.
    pub chat_id: String,
    /// Display name, if the gateway reported one when the client was first seen.
    pub name: Option<String>,
    /// When the client was first seen.
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a client seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// Gateway chat identifier.
    pub chat_id: ChatId,
    /// Optional display name.
    pub name: Option<String>,
}

impl NewClient {
    /// Creates an unnamed client record.
    pub fn new(chat_id: ChatId) -> Self {
        Self { chat_id, name: None }
    }

    /// Attaches a display name, truncated to the column width.
    ///
    /// Blank names are dropped.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        self.name = if name.is_empty() {
            None
        } else {
            Some(name.chars().take(MAX_CLIENT_NAME_LEN).collect())
        };
        self
    }
}

/// One message recorded for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Surrogate key.
    pub id: NotificationId,
    /// Owning client.
    pub client_id: ClientId,
    /// Message text as sent or received.
    pub message_text: String,
    /// When the message was processed.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_rejects_overlong_identifiers() {
        let raw = "7".repeat(MAX_CHAT_ID_LEN + 1);
        assert!(matches!(ChatId::parse(&raw), Err(CoreError::InvalidInput(_))));

        let raw = "7".repeat(MAX_CHAT_ID_LEN);
        assert!(ChatId::parse(&raw).is_ok());
    }

    #[test]
    fn chat_id_length_counts_characters_not_bytes() {
        let raw = "ж".repeat(MAX_CHAT_ID_LEN);
        assert!(ChatId::parse(&raw).is_ok());
    }

    #[test]
    fn new_client_name_is_trimmed_and_truncated() {
        let chat_id = ChatId::parse("79001234567@c.us").unwrap();

        let client = NewClient::new(chat_id.clone()).with_name("  Ivan  ");
        assert_eq!(client.name.as_deref(), Some("Ivan"));

        let client = NewClient::new(chat_id.clone()).with_name("   ");
        assert_eq!(client.name, None);

        let client = NewClient::new(chat_id).with_name("x".repeat(150));
        assert_eq!(client.name.map(|n| n.len()), Some(MAX_CLIENT_NAME_LEN));
    }

    #[test]
    fn identifiers_display_their_value() {
        assert_eq!(ClientId(42).to_string(), "42");
        assert_eq!(NotificationId::from(7).to_string(), "7");
    }
}
