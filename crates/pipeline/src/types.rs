use llamasum_common::{AppConfig, DEFAULT_MAX_CHUNK_TOKENS, DEFAULT_MODEL};
use llamasum_content::SourceKind;
use llamasum_llm::PromptMode;
use serde::Serialize;

/// How chunk prompts reach the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStrategy {
    /// Every chunk block joined into one message (payload size unbounded)
    #[default]
    Combined,

    /// One request per chunk block, replies joined with blank lines
    PerChunk,
}

/// Pipeline settings fixed at construction
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Chat model name
    pub model: String,

    /// Token budget per chunk
    pub max_chunk_tokens: usize,

    pub strategy: DeliveryStrategy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            strategy: DeliveryStrategy::default(),
        }
    }
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.llm_model.clone(),
            max_chunk_tokens: config.max_chunk_tokens,
            strategy: DeliveryStrategy::default(),
        }
    }
}

/// One invocation: input string, mode, optional instruction override
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: String,
    pub mode: PromptMode,
    pub instruction: Option<String>,
}

impl PipelineRequest {
    pub fn new(input: impl Into<String>, mode: PromptMode) -> Self {
        Self {
            input: input.into(),
            mode,
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

/// Pipeline result
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Where the text came from
    pub source: SourceKind,

    pub mode: PromptMode,

    /// Number of chunks the content was split into
    pub chunk_count: usize,

    /// Generated text, trimmed
    pub text: String,
}
