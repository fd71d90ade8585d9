//! Property-based tests for webhook parsing and reply selection.

use proptest::prelude::*;
use serde_json::json;
use wabridge_api::{
    inbound::{parse_webhook, InboundEvent},
    replies::{Reply, GREETING_KEYWORD},
};

proptest! {
    #[test]
    fn parsing_arbitrary_bytes_never_panics(body in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_webhook(&body);
    }

    #[test]
    fn keyword_in_any_case_is_a_greeting(upper in proptest::collection::vec(any::<bool>(), 6)) {
        let text: String = GREETING_KEYWORD
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_uppercase().next().unwrap_or(c) } else { c })
            .collect();
        prop_assert_eq!(Reply::for_message(&text), Reply::Greeting);
    }

    #[test]
    fn text_around_keyword_is_acknowledged(prefix in "\\PC{0,20}", suffix in "\\PC{0,20}") {
        prop_assume!(!prefix.is_empty() || !suffix.is_empty());
        let text = format!("{prefix}{}{suffix}", GREETING_KEYWORD.to_uppercase());
        prop_assert_eq!(Reply::for_message(&text), Reply::Acknowledgement);
    }

    #[test]
    fn ascii_text_is_acknowledged(text in "[ -~]{0,64}") {
        prop_assert_eq!(Reply::for_message(&text), Reply::Acknowledgement);
    }

    #[test]
    fn incoming_text_survives_parsing(
        chat_id in "[0-9]{5,15}@c\\.us",
        text in "\\PC{0,200}",
    ) {
        let body = json!({
            "typeWebhook": "incomingMessageReceived",
            "senderData": { "chatId": chat_id },
            "messageData": { "textMessageData": { "textMessage": text } }
        });

        match parse_webhook(body.to_string().as_bytes()) {
            Ok(InboundEvent::Message(message)) => {
                prop_assert_eq!(message.chat_id.as_str(), chat_id.as_str());
                prop_assert_eq!(message.text, text);
            },
            other => prop_assert!(false, "unexpected parse result: {:?}", other),
        }
    }

    #[test]
    fn non_message_types_are_ignored(kind in "[a-zA-Z]{1,30}") {
        prop_assume!(kind != "incomingMessageReceived");
        let body = json!({ "typeWebhook": kind });

        prop_assert_eq!(
            parse_webhook(body.to_string().as_bytes()).ok(),
            Some(InboundEvent::Ignored { type_webhook: kind })
        );
    }
}
