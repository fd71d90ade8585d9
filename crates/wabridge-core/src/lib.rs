//! Core domain models, storage and error types.
//!
//! Provides the strongly-typed client and notification records, the
//! PostgreSQL repositories that persist them, and the storage abstraction the
//! HTTP layer talks to. All other crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result};
pub use models::{
    ChatId, Client, ClientId, NewClient, Notification, NotificationId, MAX_CHAT_ID_LEN,
    MAX_CLIENT_NAME_LEN,
};
pub use time::{Clock, RealClock, TestClock};
