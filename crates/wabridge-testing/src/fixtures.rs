//! Builders for gateway webhook payloads.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::gateway::TEST_INSTANCE_ID;

/// Builder for a Green API webhook notification.
///
/// Defaults to an `incomingMessageReceived` text message.
pub struct WebhookBuilder {
    type_webhook: Option<String>,
    chat_id: Option<String>,
    sender_name: Option<String>,
    text: Option<String>,
    extended_text: bool,
    include_message_data: bool,
}

impl WebhookBuilder {
    /// Creates an incoming text message from `chat_id`.
    pub fn incoming(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            type_webhook: Some("incomingMessageReceived".to_string()),
            chat_id: Some(chat_id.into()),
            sender_name: None,
            text: Some(text.into()),
            extended_text: false,
            include_message_data: true,
        }
    }

    /// Creates a notification of another type, such as `outgoingMessageStatus`.
    pub fn of_type(type_webhook: impl Into<String>) -> Self {
        Self {
            type_webhook: Some(type_webhook.into()),
            chat_id: None,
            sender_name: None,
            text: None,
            extended_text: false,
            include_message_data: false,
        }
    }

    /// Sets the sender's display name.
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Sends the text as `extendedTextMessage`, as the gateway does for
    /// messages with link previews or quotes.
    pub fn extended(mut self) -> Self {
        self.extended_text = true;
        self
    }

    /// Drops `typeWebhook` from the payload.
    pub fn without_type(mut self) -> Self {
        self.type_webhook = None;
        self
    }

    /// Drops `senderData.chatId` from the payload.
    pub fn without_chat_id(mut self) -> Self {
        self.chat_id = None;
        self
    }

    /// Drops `messageData` from the payload.
    pub fn without_message_data(mut self) -> Self {
        self.include_message_data = false;
        self
    }

    /// Builds the JSON payload.
    pub fn build(self) -> Value {
        let mut payload = Map::new();

        if let Some(type_webhook) = self.type_webhook {
            payload.insert("typeWebhook".into(), json!(type_webhook));
        }
        payload.insert(
            "instanceData".into(),
            json!({
                "idInstance": TEST_INSTANCE_ID.parse::<u64>().unwrap_or_default(),
                "wid": "79000000000@c.us",
                "typeInstance": "whatsapp"
            }),
        );
        payload.insert("timestamp".into(), json!(1_700_000_000));
        payload.insert("idMessage".into(), json!(Uuid::new_v4().simple().to_string()));

        let mut sender = Map::new();
        if let Some(chat_id) = &self.chat_id {
            sender.insert("chatId".into(), json!(chat_id));
            sender.insert("sender".into(), json!(chat_id));
        }
        if let Some(name) = self.sender_name {
            sender.insert("senderName".into(), json!(name));
        }
        payload.insert("senderData".into(), Value::Object(sender));

        if self.include_message_data {
            let text = self.text.unwrap_or_default();
            let message_data = if self.extended_text {
                json!({
                    "typeMessage": "extendedTextMessage",
                    "extendedTextMessageData": { "text": text, "description": "", "title": "" }
                })
            } else {
                json!({
                    "typeMessage": "textMessage",
                    "textMessageData": { "textMessage": text }
                })
            };
            payload.insert("messageData".into(), message_data);
        }

        Value::Object(payload)
    }
}
