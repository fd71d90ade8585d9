#![no_main]

//! Fuzz target for webhook payload parsing.
//!
//! The webhook body comes straight from the network; parsing must reject
//! anything malformed with an error and never panic.

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use wabridge_api::{
    inbound::{parse_webhook, InboundEvent},
    replies::Reply,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(InboundEvent::Message(message)) = parse_webhook(data) {
        assert!(!message.chat_id.as_str().is_empty());
        let _ = Reply::for_message(&message.text).text();
    }

    // Same bytes as the text of an otherwise valid message
    let text = String::from_utf8_lossy(data).into_owned();
    let body = json!({
        "typeWebhook": "incomingMessageReceived",
        "senderData": { "chatId": "1@c.us" },
        "messageData": { "textMessageData": { "textMessage": &text } }
    });
    match parse_webhook(body.to_string().as_bytes()) {
        Ok(InboundEvent::Message(message)) => assert_eq!(message.text, text),
        other => panic!("valid message rejected: {other:?}"),
    }
});
