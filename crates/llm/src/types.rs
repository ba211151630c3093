use serde::{Deserialize, Serialize};

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Ollama chat request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name (e.g., "llama3:8b")
    pub model: String,

    /// Conversation so far
    pub messages: Vec<ChatMessage>,

    /// Disable streaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Ollama chat response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,

    /// Reply message, absent on some error payloads
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,

    /// Whether generation is complete
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Reply text; a missing message or content field reads as empty
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .unwrap_or("")
    }
}

/// Model lookup / download request
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// One line of the streamed pull progress
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub completed: Option<u64>,

    #[serde(default)]
    pub error: Option<String>,
}
