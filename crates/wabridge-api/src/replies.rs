//! Canned automatic replies to inbound messages.

/// Text that selects the greeting reply when it is the whole message, in any case.
pub const GREETING_KEYWORD: &str = "привет";

/// Reply sent when the inbound text is [`GREETING_KEYWORD`].
pub const GREETING_REPLY: &str = "Привет! Как я могу помочь?";

/// Reply sent for every other inbound message.
pub const ACKNOWLEDGEMENT_REPLY: &str = "Спасибо за ваше сообщение!";

/// Which canned reply an inbound message receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The message greeted us.
    Greeting,
    /// Anything else.
    Acknowledgement,
}

impl Reply {
    /// Selects the reply for an inbound message text.
    ///
    /// Only the bare keyword greets; surrounding text or punctuation gets the
    /// acknowledgement.
    ///
    /// # Example
    ///
    /// ```
    /// use wabridge_api::replies::Reply;
    ///
    /// assert_eq!(Reply::for_message("ПРИВЕТ"), Reply::Greeting);
    /// assert_eq!(Reply::for_message("Привет!"), Reply::Acknowledgement);
    /// assert_eq!(Reply::for_message("hello"), Reply::Acknowledgement);
    /// ```
    pub fn for_message(text: &str) -> Self {
        if text.to_lowercase() == GREETING_KEYWORD {
            Self::Greeting
        } else {
            Self::Acknowledgement
        }
    }

    /// Returns the text sent back to the chat.
    pub const fn text(self) -> &'static str {
        match self {
            Self::Greeting => GREETING_REPLY,
            Self::Acknowledgement => ACKNOWLEDGEMENT_REPLY,
        }
    }
}
