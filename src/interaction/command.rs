//! Handling of bot commands and inline button presses.

use anyhow::anyhow;
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        replies::{
            CALLBACK_ERROR, CALLBACK_GENERATED, CALLBACK_UNKNOWN, GENERATE_BUTTON_TEXT, GENERATE_CALLBACK_DATA, NOT_REGISTERED_MESSAGE, REGISTERED_MESSAGE, START_MESSAGE,
            UNREGISTERED_MESSAGE,
        },
        types::{ChatId, InlineButton, Void},
    },
    generator::EventGenerator,
    service::{chat::ChatClient, store::ChatStore},
};

/// Commands the bot reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Generate,
    Register,
    Unregister,
}

impl BotCommand {
    /// Parses `/command` or `/command@botname` at the start of a message.
    ///
    /// Commands addressed to a different bot are ignored.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;

        let name = match token.split_once('@') {
            Some((name, target)) if target.eq_ignore_ascii_case(bot_username) => name,
            Some(_) => return None,
            None => token,
        };

        match name {
            "start" => Some(Self::Start),
            "generate" => Some(Self::Generate),
            "register" => Some(Self::Register),
            "unregister" => Some(Self::Unregister),
            _ => None,
        }
    }
}

/// An incoming chat interaction, independent of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A command sent in a chat.
    Command { chat_id: ChatId, command: BotCommand },
    /// A press on an inline button; `chat_id` is the chat the button was posted in.
    Callback { query_id: String, chat_id: Option<ChatId>, data: String },
}

/// Handles a chat event on a separate task, logging any failure.
#[instrument(skip_all)]
pub fn handle_chat_event(event: ChatEvent, generator: EventGenerator, store: ChatStore, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_chat_event(&event, &generator, &store, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Processes a single chat event to completion.
#[instrument(skip(generator, store, chat))]
pub async fn process_chat_event(event: &ChatEvent, generator: &EventGenerator, store: &ChatStore, chat: &ChatClient) -> Void {
    match event {
        ChatEvent::Command { chat_id, command } => handle_command(*chat_id, *command, generator, store, chat).await,
        ChatEvent::Callback { query_id, chat_id, data } => handle_callback(query_id, *chat_id, data, generator, chat).await,
    }
}

async fn handle_command(chat_id: ChatId, command: BotCommand, generator: &EventGenerator, store: &ChatStore, chat: &ChatClient) -> Void {
    match command {
        BotCommand::Start => {
            let button = InlineButton::new(GENERATE_BUTTON_TEXT, GENERATE_CALLBACK_DATA);
            chat.send_message_with_button(chat_id, START_MESSAGE, &button).await
        }
        BotCommand::Generate => chat.send_message(chat_id, &generator.generate_event()).await,
        BotCommand::Register => {
            store.set(chat_id).await?;
            info!("Chat `{}` registered for autoposting.", chat_id);

            chat.send_message(chat_id, REGISTERED_MESSAGE).await
        }
        BotCommand::Unregister => {
            // Only the registered chat may switch autoposting off.
            if store.get().await? == Some(chat_id) {
                store.clear().await?;
                info!("Chat `{}` unregistered from autoposting.", chat_id);

                chat.send_message(chat_id, UNREGISTERED_MESSAGE).await
            } else {
                chat.send_message(chat_id, NOT_REGISTERED_MESSAGE).await
            }
        }
    }
}

async fn handle_callback(query_id: &str, chat_id: Option<ChatId>, data: &str, generator: &EventGenerator, chat: &ChatClient) -> Void {
    if data != GENERATE_CALLBACK_DATA {
        warn!("Unknown callback data `{}`.", data);
        return chat.answer_callback(query_id, CALLBACK_UNKNOWN).await;
    }

    let result = match chat_id {
        Some(chat_id) => chat.send_message(chat_id, &generator.generate_event()).await,
        None => Err(anyhow!("Callback query has no originating chat.")),
    };

    match result {
        Ok(()) => chat.answer_callback(query_id, CALLBACK_GENERATED).await,
        Err(err) => {
            error!("Failed to post generated event: {}", err);
            chat.answer_callback(query_id, CALLBACK_ERROR).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/start", "pvz_bot"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/generate", "pvz_bot"), Some(BotCommand::Generate));
        assert_eq!(BotCommand::parse("/register please", "pvz_bot"), Some(BotCommand::Register));
        assert_eq!(BotCommand::parse("  /unregister", "pvz_bot"), Some(BotCommand::Unregister));
    }

    #[test]
    fn test_parse_addressed_commands() {
        assert_eq!(BotCommand::parse("/generate@pvz_bot", "pvz_bot"), Some(BotCommand::Generate));
        assert_eq!(BotCommand::parse("/generate@PVZ_Bot", "pvz_bot"), Some(BotCommand::Generate));
        assert_eq!(BotCommand::parse("/generate@other_bot", "pvz_bot"), None);
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(BotCommand::parse("generate", "pvz_bot"), None);
        assert_eq!(BotCommand::parse("/wb", "pvz_bot"), None);
        assert_eq!(BotCommand::parse("", "pvz_bot"), None);
        assert_eq!(BotCommand::parse("hello /generate", "pvz_bot"), None);
    }
}
