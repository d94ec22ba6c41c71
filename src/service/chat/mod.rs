pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ChatId, InlineButton, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Telegram. Implementing this trait allows different chat services to be used
/// with the event bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot username.
    ///
    /// Used to ignore commands explicitly addressed to other bots.
    fn bot_username(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This receives incoming commands and button presses and dispatches
    /// them to the interaction handlers until the listener fails.
    async fn start(&self) -> Void;

    /// Send a plain text message to a chat.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Void;

    /// Send a text message with a single inline button underneath.
    async fn send_message_with_button(&self, chat_id: ChatId, text: &str, button: &InlineButton) -> Void;

    /// Acknowledge a button press with a short notification.
    async fn answer_callback(&self, query_id: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
