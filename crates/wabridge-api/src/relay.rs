//! Message relay between the HTTP handlers, storage, and the gateway.
//!
//! Both directions follow the same shape: resolve the client for a chat id
//! (creating it on first sight), then record the message. Outbound messages
//! are recorded only after the gateway accepted them. Inbound messages are
//! recorded first and answered with a canned reply, which is not recorded.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use wabridge_core::{storage::BridgeStorage, ChatId, Client, Clock, NewClient, Notification};
use wabridge_gateway::GatewayClient;

use crate::{error::Result, inbound::IncomingMessage, replies::Reply};

/// Result of relaying an outbound message.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Client the message was sent to.
    pub client: Client,
    /// Notification recorded for the message.
    pub notification: Notification,
    /// Gateway response body, returned to the caller verbatim.
    pub gateway_body: serde_json::Value,
}

/// Result of handling an inbound message.
#[derive(Debug, Clone)]
pub struct HandledMessage {
    /// Client the message came from.
    pub client: Client,
    /// Notification recorded for the message.
    pub notification: Notification,
    /// Reply selected for the message.
    pub reply: Reply,
    /// Whether the gateway accepted the reply.
    pub reply_sent: bool,
}

/// Relays messages between chats and the store.
#[derive(Clone)]
pub struct RelayService {
    storage: Arc<dyn BridgeStorage>,
    gateway: Arc<GatewayClient>,
    clock: Arc<dyn Clock>,
}

impl RelayService {
    /// Creates a relay over the given storage, gateway client, and clock.
    pub fn new(
        storage: Arc<dyn BridgeStorage>,
        gateway: Arc<GatewayClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { storage, gateway, clock }
    }

    /// Sends a message to a chat and records it.
    ///
    /// The client is created before the gateway call, so a failed send can
    /// leave a client without notifications. A gateway error answered with a
    /// JSON body is still recorded and its body handed back to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` on database failures and
    /// `ApiError::Gateway` if the gateway call fails without a JSON answer.
    #[instrument(name = "relay_send", skip_all, fields(chat_id = %chat_id))]
    pub async fn send_message(&self, chat_id: ChatId, message_text: String) -> Result<SentMessage> {
        let client = self
            .storage
            .find_or_create_client(NewClient::new(chat_id.clone()), self.clock.now_utc())
            .await?;
        debug!(client_id = %client.id, "Resolved client");

        let response = self.gateway.send_message(chat_id.as_str(), &message_text).await?;

        let notification = self
            .storage
            .record_notification(client.id, message_text, self.clock.now_utc())
            .await?;

        if response.is_success() {
            info!(
                client_id = %client.id,
                notification_id = %notification.id,
                gateway_status = response.status_code,
                "Outbound message relayed"
            );
        } else {
            warn!(
                client_id = %client.id,
                notification_id = %notification.id,
                gateway_status = response.status_code,
                "Gateway answered outbound message with an error body"
            );
        }

        Ok(SentMessage { client, notification, gateway_body: response.body })
    }

    /// Records an inbound message and answers it.
    ///
    /// A reply the gateway refuses is logged; the inbound message stays
    /// recorded either way.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` on database failures.
    #[instrument(name = "relay_incoming", skip_all, fields(chat_id = %message.chat_id))]
    pub async fn handle_incoming(&self, message: IncomingMessage) -> Result<HandledMessage> {
        let IncomingMessage { chat_id, sender_name, text } = message;

        let mut new_client = NewClient::new(chat_id.clone());
        if let Some(name) = sender_name {
            new_client = new_client.with_name(name);
        }
        let client = self.storage.find_or_create_client(new_client, self.clock.now_utc()).await?;

        let reply = Reply::for_message(&text);

        let notification =
            self.storage.record_notification(client.id, text, self.clock.now_utc()).await?;

        info!(
            client_id = %client.id,
            notification_id = %notification.id,
            reply = ?reply,
            "Inbound message recorded"
        );

        let reply_sent = match self.gateway.send_message(chat_id.as_str(), reply.text()).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(status = response.status_code, "Gateway refused automatic reply");
                false
            },
            Err(e) => {
                warn!(error = %e, "Failed to send automatic reply");
                false
            },
        };

        Ok(HandledMessage { client, notification, reply, reply_sent })
    }
}
