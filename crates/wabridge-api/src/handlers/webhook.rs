//! Gateway webhook endpoint.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    error::Result,
    inbound::{parse_webhook, InboundEvent},
    AppState,
};

/// Fixed acknowledgement returned for every accepted notification.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Always `"ok"`.
    pub status: &'static str,
}

impl WebhookAck {
    const OK: Self = Self { status: "ok" };
}

/// Receives a gateway notification.
///
/// Incoming messages are recorded and answered with a canned reply; other
/// notification types are acknowledged untouched. The body is read as raw
/// bytes so the gateway's content type does not matter.
///
/// # Errors
///
/// - 400 `E1002` if the body is malformed or lacks the sender's chat id
/// - 500 on database failures
#[instrument(name = "receive_webhook", skip_all, fields(body_size = body.len()))]
pub async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<WebhookAck>> {
    match parse_webhook(&body)? {
        InboundEvent::Message(message) => {
            let handled = state.relay.handle_incoming(message).await?;
            debug!(reply_sent = handled.reply_sent, "Webhook processed");
        },
        InboundEvent::Ignored { type_webhook } => {
            info!(type_webhook = %type_webhook, "Ignoring non-message webhook");
        },
    }

    Ok(Json(WebhookAck::OK))
}
