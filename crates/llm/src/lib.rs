//! llamasum LLM integration
//!
//! Tokenizer-based chunking, prompt assembly and the Ollama chat client

mod chunking;
mod client;
mod llm_trait;
mod prompts;
mod tokenizer;
mod types;

pub use chunking::{chunk_count, chunk_text, TextChunk};
pub use client::OllamaClient;
pub use llm_trait::ChatBackend;
pub use prompts::{chunk_prompt, select_instruction, PromptMode, PromptTask, SUMMARY_PROMPT, TWEET_PROMPT};
pub use tokenizer::{Gpt2Tokenizer, TokenId, Tokenizer};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatResponseMessage, ModelRequest, PullProgress};
