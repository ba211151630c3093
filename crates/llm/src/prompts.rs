//! Prompt templates and payload assembly

use llamasum_common::{LlamasumError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chunking::TextChunk;

/// Built-in instruction for summary mode
pub const SUMMARY_PROMPT: &str = "Generate a concise summary from the provided text. write five bullets points on the key info and then write a summary expanding on those points into a 500 word essay.";

/// Built-in instruction for tweet mode
pub const TWEET_PROMPT: &str = "Generate an opinionated Twitter response based on the provided text.";

/// Separator between the instruction and a chunk, and between chunk blocks
const BLOCK_SEPARATOR: &str = "\n\n";

/// What kind of response to ask the model for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Summary,
    Tweet,
}

impl PromptMode {
    /// Built-in instruction for this mode
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Summary => SUMMARY_PROMPT,
            Self::Tweet => TWEET_PROMPT,
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => f.write_str("summary"),
            Self::Tweet => f.write_str("tweet"),
        }
    }
}

impl FromStr for PromptMode {
    type Err = LlamasumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "tweet" => Ok(Self::Tweet),
            other => Err(LlamasumError::invalid_input(format!("unknown mode '{}'", other))),
        }
    }
}

/// Pick the instruction: a non-blank override wins over the mode's built-in
pub fn select_instruction(mode: PromptMode, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => mode.instruction().to_string(),
    }
}

/// Instruction paired with the chunks it applies to
#[derive(Debug, Clone)]
pub struct PromptTask {
    pub instruction: String,
    pub chunks: Vec<TextChunk>,
}

impl PromptTask {
    pub fn new(mode: PromptMode, custom: Option<&str>, chunks: Vec<TextChunk>) -> Self {
        Self {
            instruction: select_instruction(mode, custom),
            chunks,
        }
    }

    /// One `instruction + blank line + chunk` block per chunk
    pub fn chunk_prompts(&self) -> Vec<String> {
        self.chunks
            .iter()
            .map(|chunk| chunk_prompt(&self.instruction, &chunk.text))
            .collect()
    }

    /// All chunk blocks joined into the single outgoing message.
    ///
    /// Chunking bounds each block, not this combined payload.
    pub fn payload(&self) -> String {
        self.chunk_prompts().join(BLOCK_SEPARATOR)
    }
}

/// Prompt for a single chunk
pub fn chunk_prompt(instruction: &str, chunk: &str) -> String {
    format!("{}{}{}", instruction, BLOCK_SEPARATOR, chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, text: &str) -> TextChunk {
        TextChunk {
            index,
            tokens: index..index + 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("summary".parse::<PromptMode>().unwrap(), PromptMode::Summary);
        assert_eq!(" Tweet ".parse::<PromptMode>().unwrap(), PromptMode::Tweet);
        assert!("haiku".parse::<PromptMode>().is_err());
        assert_eq!(PromptMode::Tweet.to_string(), "tweet");
    }

    #[test]
    fn test_select_instruction() {
        assert_eq!(select_instruction(PromptMode::Summary, None), SUMMARY_PROMPT);
        assert_eq!(select_instruction(PromptMode::Tweet, Some("   \n")), TWEET_PROMPT);
        assert_eq!(
            select_instruction(PromptMode::Tweet, Some("  Translate to French. ")),
            "Translate to French."
        );
    }

    #[test]
    fn test_single_chunk_payload() {
        let task = PromptTask::new(PromptMode::Summary, None, vec![chunk(0, "Hello world")]);
        assert_eq!(task.payload(), format!("{}\n\nHello world", SUMMARY_PROMPT));
    }

    #[test]
    fn test_multi_chunk_payload_repeats_instruction() {
        let task = PromptTask::new(
            PromptMode::Tweet,
            Some("Be brief."),
            vec![chunk(0, "first"), chunk(1, "second")],
        );

        assert_eq!(task.chunk_prompts(), vec!["Be brief.\n\nfirst", "Be brief.\n\nsecond"]);
        assert_eq!(task.payload(), "Be brief.\n\nfirst\n\nBe brief.\n\nsecond");
    }

    #[test]
    fn test_empty_task_payload() {
        let task = PromptTask::new(PromptMode::Summary, None, Vec::new());
        assert_eq!(task.payload(), "");
    }
}
