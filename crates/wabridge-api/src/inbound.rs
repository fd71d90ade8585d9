//! Parsing of gateway webhook payloads.
//!
//! Only `incomingMessageReceived` notifications carry a message to record.
//! Other notification types (outgoing message statuses, instance state
//! changes) are recognised and skipped. Payloads without a `typeWebhook`
//! are treated as incoming messages.

use serde::Deserialize;
use wabridge_core::ChatId;

use crate::error::{ApiError, Result};

/// `typeWebhook` value of an inbound chat message.
pub const INCOMING_MESSAGE_RECEIVED: &str = "incomingMessageReceived";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    type_webhook: Option<String>,
    sender_data: Option<SenderData>,
    message_data: Option<MessageData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SenderData {
    chat_id: Option<String>,
    sender_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageData {
    text_message_data: Option<TextMessageData>,
    extended_text_message_data: Option<ExtendedTextMessageData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextMessageData {
    text_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtendedTextMessageData {
    text: Option<String>,
}

/// An inbound chat message extracted from a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Sender's chat identifier.
    pub chat_id: ChatId,
    /// Sender's display name, if the gateway supplied one.
    pub sender_name: Option<String>,
    /// Message text; empty for non-text messages.
    pub text: String,
}

/// What a webhook notification asks the bridge to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Record the message and reply.
    Message(IncomingMessage),
    /// Acknowledge without processing.
    Ignored {
        /// The notification's `typeWebhook`.
        type_webhook: String,
    },
}

/// Parses a raw webhook body.
///
/// # Errors
///
/// - `MalformedPayload` if the body is not JSON of the expected shape, or an
///   incoming message lacks `senderData.chatId` or `messageData`
/// - `InvalidInput` if the chat id fails validation
pub fn parse_webhook(body: &[u8]) -> Result<InboundEvent> {
    let payload: WebhookPayload = serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedPayload(format!("invalid webhook body: {e}")))?;

    if let Some(type_webhook) = payload.type_webhook {
        if type_webhook != INCOMING_MESSAGE_RECEIVED {
            return Ok(InboundEvent::Ignored { type_webhook });
        }
    }

    let sender = payload
        .sender_data
        .ok_or_else(|| ApiError::MalformedPayload("senderData is required".to_string()))?;
    let raw_chat_id = sender
        .chat_id
        .ok_or_else(|| ApiError::MalformedPayload("senderData.chatId is required".to_string()))?;
    let chat_id = ChatId::parse(&raw_chat_id)?;

    let message = payload
        .message_data
        .ok_or_else(|| ApiError::MalformedPayload("messageData is required".to_string()))?;

    let text = message
        .text_message_data
        .and_then(|data| data.text_message)
        .or_else(|| message.extended_text_message_data.and_then(|data| data.text))
        .unwrap_or_default();

    Ok(InboundEvent::Message(IncomingMessage {
        chat_id,
        sender_name: sender.sender_name,
        text,
    }))
}
