use llamasum_common::{AppConfig, LlamasumError, Result};
use llamasum_content::{
    classify, ArticleExtractor, ArticleSource, ExtractedText, InputSource, SourceKind,
    TranscriptExtractor, TranscriptSource, YouTubeTranscriptClient,
};
use llamasum_llm::{chunk_text, ChatBackend, ChatMessage, Gpt2Tokenizer, OllamaClient, PromptTask, Tokenizer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::types::{DeliveryStrategy, PipelineOutput, PipelineRequest, PipelineSettings};

const EMPTY_INPUT_MESSAGE: &str =
    "Please enter text, a link to an article, or a YouTube video URL.";

/// Content resolution and chunked-prompt pipeline.
///
/// Stages run strictly in order: classify, extract, chunk, prompt, generate.
/// Every collaborator is injected so front ends and tests choose the
/// implementations.
pub struct Pipeline {
    articles: Arc<dyn ArticleSource>,
    transcripts: TranscriptExtractor,
    backend: Arc<dyn ChatBackend>,
    tokenizer: Arc<dyn Tokenizer>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Create pipeline from explicit collaborators
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        transcripts: Arc<dyn TranscriptSource>,
        backend: Arc<dyn ChatBackend>,
        tokenizer: Arc<dyn Tokenizer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            articles,
            transcripts: TranscriptExtractor::new(transcripts),
            backend,
            tokenizer,
            settings,
        }
    }

    /// Wire the HTTP extractors, Ollama and GPT-2 from configuration
    pub fn from_config(config: &AppConfig, backend: Arc<OllamaClient>) -> Result<Self> {
        let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);

        Ok(Self::new(
            Arc::new(ArticleExtractor::new(fetch_timeout)?),
            Arc::new(YouTubeTranscriptClient::new(fetch_timeout)?),
            backend,
            Arc::new(Gpt2Tokenizer::new()?),
            PipelineSettings::from(config),
        ))
    }

    pub fn with_strategy(mut self, strategy: DeliveryStrategy) -> Self {
        self.settings.strategy = strategy;
        self
    }

    /// Run one request end to end
    pub async fn run(&self, request: PipelineRequest, cancel: &CancellationToken) -> Result<PipelineOutput> {
        let (source, text) = self.resolve(&request.input, cancel).await?;

        ensure_active(cancel)?;
        let task = self.build_task(&request, text.as_str())?;
        let chunk_count = task.chunks.len();

        let text = self.generate(&task, cancel).await?;
        info!("Generated {} chars from {} chunk(s)", text.len(), chunk_count);

        Ok(PipelineOutput {
            source,
            mode: request.mode,
            chunk_count,
            text,
        })
    }

    /// Classify the input and turn it into plain text
    pub async fn resolve(&self, input: &str, cancel: &CancellationToken) -> Result<(SourceKind, ExtractedText)> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LlamasumError::invalid_input(EMPTY_INPUT_MESSAGE));
        }

        let source = classify(input);
        let kind = source.kind();
        info!("Resolving {} input", kind);

        let text = match source {
            InputSource::RawText(text) => ExtractedText::new(text)?,
            InputSource::ArticleUrl(url) => cancellable(cancel, self.articles.fetch_article(&url)).await?,
            InputSource::YouTubeUrl(url) => cancellable(cancel, self.transcripts.extract(&url)).await?,
        };

        debug!("Resolved {} chars of {} content", text.as_str().len(), kind);
        Ok((kind, text))
    }

    /// Chunk the text and pair it with the selected instruction
    pub fn build_task(&self, request: &PipelineRequest, text: &str) -> Result<PromptTask> {
        let chunks = chunk_text(self.tokenizer.as_ref(), text, self.settings.max_chunk_tokens)?;
        if chunks.is_empty() {
            return Err(LlamasumError::NothingToSummarize);
        }

        if chunks.len() > 1 && self.settings.strategy == DeliveryStrategy::Combined {
            warn!(
                "Content spans {} chunks; the combined payload may exceed the model context",
                chunks.len()
            );
        }

        Ok(PromptTask::new(request.mode, request.instruction.as_deref(), chunks))
    }

    /// Send the task to the backend and return the trimmed reply
    pub async fn generate(&self, task: &PromptTask, cancel: &CancellationToken) -> Result<String> {
        match self.settings.strategy {
            DeliveryStrategy::Combined => {
                let reply = cancellable(cancel, self.send(task.payload())).await?;
                Ok(reply.trim().to_string())
            }
            DeliveryStrategy::PerChunk => {
                let prompts = task.chunk_prompts();
                let mut replies = Vec::with_capacity(prompts.len());
                for (i, prompt) in prompts.into_iter().enumerate() {
                    debug!("Sending chunk {}/{}", i + 1, task.chunks.len());
                    let reply = cancellable(cancel, self.send(prompt)).await?;
                    replies.push(reply.trim().to_string());
                }
                Ok(replies.join("\n\n").trim().to_string())
            }
        }
    }

    async fn send(&self, payload: String) -> Result<String> {
        self.backend
            .chat(&self.settings.model, vec![ChatMessage::user(payload)])
            .await
            .map_err(|e| match e {
                LlamasumError::Generation { .. } | LlamasumError::Cancelled => e,
                other => LlamasumError::Generation {
                    message: other.to_string(),
                    source: Some(Box::new(other)),
                },
            })
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(LlamasumError::Cancelled);
    }
    Ok(())
}

/// Race a stage against the cancellation token
async fn cancellable<T, F>(cancel: &CancellationToken, stage: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LlamasumError::Cancelled),
        result = stage => result,
    }
}
