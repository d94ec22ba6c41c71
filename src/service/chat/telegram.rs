//! Telegram Bot API integration for the event bot.
//!
//! This module talks to the Bot API over HTTPS:
//! - Long-polls `getUpdates` for commands and button presses
//! - Sends messages, optionally with an inline button
//! - Answers callback queries
//!
//! Incoming updates are translated into [`ChatEvent`]s and dispatched to the
//! interaction handlers.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatId, InlineButton, Res, Void},
    },
    generator::EventGenerator,
    interaction::{
        self,
        command::{BotCommand, ChatEvent},
    },
    service::store::ChatStore,
};

use super::{ChatClient, GenericChatClient};

/// Pause after a failed `getUpdates` call before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Margin on top of the long-poll timeout for the HTTP request itself.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Update kinds the bot subscribes to.
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, generator: EventGenerator, store: ChatStore) -> Res<Self> {
        let client = TelegramChatClient::new(config, generator, store).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<&'a InlineButton>>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    text: &'a str,
}

/// Translates a raw update into something the interaction handlers understand.
///
/// Updates that are neither a known command nor a button press yield `None`.
pub(crate) fn update_to_event(update: Update, bot_username: &str) -> Option<ChatEvent> {
    if let Some(query) = update.callback_query {
        return Some(ChatEvent::Callback {
            query_id: query.id,
            chat_id: query.message.map(|m| m.chat.id),
            data: query.data.unwrap_or_default(),
        });
    }

    let message = update.message?;
    let command = BotCommand::parse(message.text.as_deref()?, bot_username)?;

    Some(ChatEvent::Command { chat_id: message.chat.id, command })
}

// Structs.

/// Telegram client implementation.
#[derive(Clone)]
struct TelegramChatClient {
    pub http: reqwest::Client,
    pub api_base: String,
    pub bot_username: String,
    pub poll_timeout_secs: u64,
    pub generator: EventGenerator,
    pub store: ChatStore,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, generator: EventGenerator, store: ChatStore) -> Res<Self> {
        // Initialize the HTTP client.

        let http = reqwest::Client::builder().timeout(Duration::from_secs(config.poll_timeout_secs) + HTTP_TIMEOUT_MARGIN).build()?;
        let api_base = format!("{}/bot{}", config.telegram_api_url.trim_end_matches('/'), config.bot_token);

        let mut client = Self {
            http,
            api_base,
            bot_username: String::new(),
            poll_timeout_secs: config.poll_timeout_secs,
            generator,
            store,
        };

        // Get the bot's username.

        let me: User = client.call("getMe", &serde_json::json!({})).await?;
        client.bot_username = me.username.unwrap_or_default();

        info!("Telegram bot username: {}", client.bot_username);

        Ok(client)
    }

    /// Calls a Bot API method and unwraps the response envelope.
    async fn call<P, R>(&self, method: &str, params: &P) -> Res<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // Request errors are stripped of their URL, which embeds the bot token.
        let response = self
            .http
            .post(format!("{}/{}", self.api_base, method))
            .json(params)
            .send()
            .await
            .map_err(|e| anyhow!("Telegram `{}` request failed: {}", method, e.without_url()))?;

        let body: ApiResponse<R> = response.json().await.map_err(|e| anyhow!("Telegram `{}` returned an unreadable response: {}", method, e.without_url()))?;

        if !body.ok {
            return Err(anyhow!("Telegram `{}` failed: {}", method, body.description.unwrap_or_else(|| "no description".to_string())));
        }

        body.result.ok_or_else(|| anyhow!("Telegram `{}` returned no result.", method))
    }

    async fn get_updates(&self, offset: i64) -> Res<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };

        self.call("getUpdates", &params).await
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    fn bot_username(&self) -> &str {
        &self.bot_username
    }

    async fn start(&self) -> Void {
        let chat = ChatClient::from(self.clone());
        let mut offset = 0;

        info!("Listening for Telegram updates ...");

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    warn!("Polling error: {}", err);
                    tokio::time::sleep(POLL_ERROR_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                match update_to_event(update, &self.bot_username) {
                    Some(event) => interaction::command::handle_chat_event(event, self.generator.clone(), self.store.clone(), chat.clone()),
                    None => debug!("Ignoring update without a supported command."),
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Void {
        let request = SendMessage { chat_id, text, reply_markup: None };

        let _: serde_json::Value = self.call("sendMessage", &request).await.map_err(|e| anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message_with_button(&self, chat_id: ChatId, text: &str, button: &InlineButton) -> Void {
        let request = SendMessage {
            chat_id,
            text,
            reply_markup: Some(InlineKeyboardMarkup { inline_keyboard: vec![vec![button]] }),
        };

        let _: serde_json::Value = self.call("sendMessage", &request).await.map_err(|e| anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn answer_callback(&self, query_id: &str, text: &str) -> Void {
        let request = AnswerCallbackQuery { callback_query_id: query_id, text };

        let _: bool = self.call("answerCallbackQuery", &request).await.map_err(|e| anyhow!("Failed to answer callback: {}", e))?;

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_command_update() {
        let update = update(serde_json::json!({
            "update_id": 10,
            "message": { "message_id": 1, "chat": { "id": -100123, "type": "group" }, "text": "/generate@pvz_bot" }
        }));

        let event = update_to_event(update, "pvz_bot");

        assert_eq!(event, Some(ChatEvent::Command { chat_id: -100123, command: BotCommand::Generate }));
    }

    #[test]
    fn test_plain_text_is_ignored() {
        let update = update(serde_json::json!({
            "update_id": 11,
            "message": { "message_id": 2, "chat": { "id": 5, "type": "private" }, "text": "hello" }
        }));

        assert_eq!(update_to_event(update, "pvz_bot"), None);
    }

    #[test]
    fn test_message_without_text_is_ignored() {
        let update = update(serde_json::json!({
            "update_id": 12,
            "message": { "message_id": 3, "chat": { "id": 5, "type": "private" } }
        }));

        assert_eq!(update_to_event(update, "pvz_bot"), None);
    }

    #[test]
    fn test_callback_update() {
        let update = update(serde_json::json!({
            "update_id": 13,
            "callback_query": {
                "id": "q1",
                "from": { "id": 7, "is_bot": false, "first_name": "Аня" },
                "data": "generate",
                "message": { "message_id": 4, "chat": { "id": 42, "type": "private" }, "text": "Привет!" }
            }
        }));

        assert_eq!(
            update_to_event(update, "pvz_bot"),
            Some(ChatEvent::Callback {
                query_id: "q1".to_string(),
                chat_id: Some(42),
                data: "generate".to_string(),
            })
        );
    }

    #[test]
    fn test_send_message_payload() {
        let button = InlineButton::new("Сгенерировать действие", "generate");
        let request = SendMessage {
            chat_id: 42,
            text: "Привет!",
            reply_markup: Some(InlineKeyboardMarkup { inline_keyboard: vec![vec![&button]] }),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "chat_id": 42,
                "text": "Привет!",
                "reply_markup": { "inline_keyboard": [[{ "text": "Сгенерировать действие", "callback_data": "generate" }]] }
            })
        );

        let plain = SendMessage { chat_id: 42, text: "x", reply_markup: None };
        assert_eq!(serde_json::to_value(&plain).unwrap(), serde_json::json!({ "chat_id": 42, "text": "x" }));
    }

    #[test]
    fn test_error_envelope() {
        let body: ApiResponse<bool> = serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#).unwrap();

        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Unauthorized"));
        assert!(body.result.is_none());
    }
}
