//! HTTP request handlers.
//!
//! - `messages` - outbound relay (`POST /send_message`)
//! - `webhook` - gateway notifications (`POST /webhook`)
//! - `health` - health, readiness, and liveness checks
//!
//! Handlers return [`crate::ApiError`] on failure, which renders as a JSON
//! error body with a stable code.

pub mod health;
pub mod messages;
pub mod webhook;

pub use health::{health_check, liveness_check, readiness_check};
pub use messages::send_message;
pub use webhook::receive_webhook;
