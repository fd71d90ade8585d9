//! Outbound message endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use wabridge_core::ChatId;

use crate::{
    error::{ApiError, Result},
    AppState,
};

/// Request body of `POST /send_message`.
///
/// Both fields are optional at the type level so their absence can be
/// reported as a missing-field error rather than a deserialisation failure.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageBody {
    /// Destination chat identifier.
    pub chat_id: Option<String>,
    /// Message text.
    pub message_text: Option<String>,
}

/// Sends a message through the gateway and records it.
///
/// Responds with the gateway's JSON body verbatim on success.
///
/// # Errors
///
/// - 400 `E1001` if `chat_id` or `message_text` is missing or empty
/// - 400 `E1002` if the body is not a JSON object of the expected shape
/// - 400 `E1003` if `chat_id` is too long
/// - 502/504 if the gateway call fails
/// - 500 on database failures
#[instrument(name = "send_message", skip_all)]
pub async fn send_message(
    State(state): State<AppState>,
    body: std::result::Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection, "Rejected send request body");
        ApiError::MalformedPayload(rejection.body_text())
    })?;

    let (chat_id, message_text) = match (body.chat_id, body.message_text) {
        (Some(chat_id), Some(text)) if !chat_id.trim().is_empty() && !text.is_empty() => {
            (chat_id, text)
        },
        _ => {
            warn!("Send request is missing required fields");
            return Err(ApiError::MissingFields(
                "chat_id and message_text are required".to_string(),
            ));
        },
    };

    let chat_id = ChatId::parse(&chat_id)?;
    info!(chat_id = %chat_id, "Processing send request");

    let sent = state.relay.send_message(chat_id, message_text).await?;

    Ok(Json(sent.gateway_body))
}
