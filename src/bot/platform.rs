use async_trait::async_trait;
use thiserror::Error;

use super::ChatId;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("chat platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat platform rejected the request: {0}")]
    Api(String),
}

/// One inline button: visible label plus the payload sent back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub data: String,
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError>;

    /// Sends `text` with one inline button per choice.
    async fn send_choices(
        &self,
        chat_id: ChatId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), PlatformError>;

    /// Forwards a previously uploaded document by its file identifier.
    async fn send_document(&self, chat_id: ChatId, file_id: &str) -> Result<(), PlatformError>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), PlatformError>;
}
