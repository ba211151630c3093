use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use llamasum_common::{LlamasumError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm_trait::ChatBackend;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ModelRequest, PullProgress};

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlamasumError::generation_with("Failed to create HTTP client", e))?;

        info!("Ollama client initialized: {}", base_url);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Single chat call, no retries
    async fn try_chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(|e| LlamasumError::generation_with("Failed to send chat request", e))?
            .error_for_status()
            .map_err(|e| LlamasumError::generation_with("Ollama API error", e))?;

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlamasumError::generation_with("Failed to parse chat response", e))?;

        if result.message.is_none() {
            warn!("Chat response has no message field, treating as empty");
        }

        Ok(result.content().to_string())
    }

    /// Whether the model is installed locally.
    ///
    /// Any non-success answer from `/api/show` counts as missing so the
    /// caller falls through to a pull.
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        let request = ModelRequest {
            model: model.to_string(),
            stream: None,
        };

        let response = self
            .client
            .post(self.endpoint("/api/show"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlamasumError::generation_with("Failed to connect to Ollama", e))?;

        Ok(model_present(model, response.status()))
    }

    /// Make sure the model is present, pulling it when missing
    pub async fn ensure_model(&self, model: &str) -> Result<()> {
        if self.has_model(model).await? {
            debug!("Model already installed: {}", model);
            return Ok(());
        }

        info!("Model not found, pulling: {}", model);
        self.pull_model(model).await
    }

    /// Pull a model, rendering the streamed progress
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        let request = ModelRequest {
            model: model.to_string(),
            stream: Some(true),
        };

        let response = self
            .client
            .post(self.endpoint("/api/pull"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlamasumError::generation_with("Failed to send pull request", e))?
            .error_for_status()
            .map_err(|e| LlamasumError::generation_with("Ollama pull error", e))?;

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .map_err(|e| LlamasumError::Other(e.into()))?
                .progress_chars("#>-"),
        );

        // Parse NDJSON (newline-delimited JSON) as it arrives
        let mut buffer = String::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LlamasumError::generation_with("Pull stream error", e))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                apply_pull_line(&pb, line.trim())?;
            }
        }
        apply_pull_line(&pb, buffer.trim())?;

        pb.finish_with_message(format!("Pulled {}", model));
        info!("Model pull complete: {}", model);

        Ok(())
    }
}

/// Map a `/api/show` status to "installed"; anything but success means pull
fn model_present(model: &str, status: StatusCode) -> bool {
    if status.is_success() {
        return true;
    }
    if status != StatusCode::NOT_FOUND {
        warn!("Model lookup for {} returned {}; pulling anyway", model, status);
    }
    false
}

/// Update the progress bar from one NDJSON line; an `error` field aborts the pull
fn apply_pull_line(pb: &ProgressBar, line: &str) -> Result<()> {
    if line.is_empty() {
        return Ok(());
    }

    let progress: PullProgress = match serde_json::from_str(line) {
        Ok(progress) => progress,
        Err(e) => {
            debug!("Skipping unparseable pull line: {}", e);
            return Ok(());
        }
    };

    if let Some(error) = progress.error {
        return Err(LlamasumError::generation(format!("Model pull failed: {}", error)));
    }

    pb.set_message(progress.status);
    if let Some(total) = progress.total {
        pb.set_length(total);
    }
    if let Some(completed) = progress.completed {
        pb.set_position(completed);
    }

    Ok(())
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            stream: Some(false),
        };

        let prompt_len: usize = request.messages.iter().map(|m| m.content.len()).sum();
        debug!(
            "Sending chat request to Ollama - Model: {}, Prompt length: {}",
            request.model, prompt_len
        );

        let reply = self.try_chat(&request).await?;
        debug!("Received response from Ollama - Length: {}", reply.len());

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.endpoint("/api/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_model_present_only_on_success() {
        assert!(model_present("llama3:8b", StatusCode::OK));
        assert!(!model_present("llama3:8b", StatusCode::NOT_FOUND));
        assert!(!model_present("llama3:8b", StatusCode::BAD_REQUEST));
        assert!(!model_present("llama3:8b", StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_apply_pull_line_updates_progress() {
        let pb = ProgressBar::hidden();
        apply_pull_line(&pb, r#"{"status":"pulling manifest"}"#).unwrap();
        apply_pull_line(&pb, r#"{"status":"pulling abc","total":100,"completed":40}"#).unwrap();
        assert_eq!(pb.length(), Some(100));
        assert_eq!(pb.position(), 40);

        apply_pull_line(&pb, "").unwrap();
        apply_pull_line(&pb, "not json").unwrap();
    }

    #[test]
    fn test_apply_pull_line_error() {
        let pb = ProgressBar::hidden();
        let err = apply_pull_line(&pb, r#"{"error":"pull model manifest: file does not exist"}"#)
            .unwrap_err();
        assert!(matches!(err, LlamasumError::Generation { .. }));
        assert!(err.to_string().contains("file does not exist"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_generation_error() {
        // Port 9 (discard) is not an Ollama server
        let client = OllamaClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .chat("llama3:8b", vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlamasumError::Generation { .. }));
    }
}
