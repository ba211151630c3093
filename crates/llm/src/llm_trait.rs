use async_trait::async_trait;
use llamasum_common::Result;

use crate::types::ChatMessage;

/// Chat-completion backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the messages and return the raw reply text (untrimmed, possibly empty)
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String>;
}
