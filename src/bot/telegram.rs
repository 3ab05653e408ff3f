//! Telegram Bot API over plain HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::conversation::{Command, Incoming};
use super::platform::{ChatPlatform, Choice, PlatformError};
use super::runner::UpdateSource;
use super::ChatId;

#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// The chat this update belongs to and what happened in it. `None` for
    /// update kinds the bot does not handle.
    pub fn into_event(self) -> Option<(ChatId, Incoming)> {
        if let Some(query) = self.callback_query {
            let chat_id = query.message.as_ref()?.chat.id;
            return Some((
                chat_id,
                Incoming::Callback {
                    id: query.id,
                    data: query.data.unwrap_or_default(),
                },
            ));
        }

        let message = self.message?;
        let chat_id = message.chat.id;
        let event = if let Some(document) = message.document {
            Incoming::Document {
                file_id: document.file_id,
            }
        } else if let Some(text) = message.text {
            match Command::parse(&text) {
                Some(command) => Incoming::Command(command),
                None => Incoming::Text(text),
            }
        } else {
            Incoming::Unsupported
        };
        Some((chat_id, event))
    }
}

#[derive(Clone)]
pub struct TelegramPlatform {
    client: Client,
    /// `{api_url}/bot{token}`
    endpoint: String,
    poll_timeout: Duration,
}

impl TelegramPlatform {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Self {
        TelegramPlatform {
            client: Client::new(),
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, PlatformError> {
        let reply: ApiReply<T> = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !reply.ok {
            return Err(PlatformError::Api(
                reply.description.unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        reply
            .result
            .ok_or_else(|| PlatformError::Api(format!("{method} returned no result")))
    }
}

#[async_trait]
impl UpdateSource for TelegramPlatform {
    /// Long-polls for updates after `offset`.
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, PlatformError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError> {
        self.call::<Value>("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn send_choices(
        &self,
        chat_id: ChatId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), PlatformError> {
        self.call::<Value>(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": inline_keyboard(choices),
            }),
        )
        .await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, file_id: &str) -> Result<(), PlatformError> {
        self.call::<Value>("sendDocument", &json!({ "chat_id": chat_id, "document": file_id }))
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), PlatformError> {
        self.call::<Value>("answerCallbackQuery", &json!({ "callback_query_id": callback_id }))
            .await?;
        Ok(())
    }
}

/// One button per row.
fn inline_keyboard(choices: &[Choice]) -> Value {
    let rows: Vec<Value> = choices
        .iter()
        .map(|choice| json!([{ "text": choice.label, "callback_data": choice.data }]))
        .collect();
    json!({ "inline_keyboard": rows })
}
