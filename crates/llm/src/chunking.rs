use llamasum_common::{LlamasumError, Result};
use std::ops::Range;
use tracing::debug;

use crate::tokenizer::Tokenizer;

/// Text chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the chunk sequence
    pub index: usize,

    /// Token span in the encoded source
    pub tokens: Range<usize>,

    /// Decoded text of the span
    pub text: String,
}

impl TextChunk {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Number of chunks a text of `token_count` tokens splits into
pub fn chunk_count(token_count: usize, max_tokens: usize) -> usize {
    if max_tokens == 0 {
        return 0;
    }
    token_count.div_ceil(max_tokens)
}

/// Split text into consecutive windows of at most `max_tokens` tokens.
///
/// Windows never overlap and only the last one may be short, so the spans
/// concatenate back to the full token sequence. Empty text yields no chunks.
pub fn chunk_text(tokenizer: &dyn Tokenizer, text: &str, max_tokens: usize) -> Result<Vec<TextChunk>> {
    if max_tokens == 0 {
        return Err(LlamasumError::invalid_input("chunk token budget must be positive"));
    }

    let tokens = tokenizer.encode(text);
    let mut chunks = Vec::with_capacity(chunk_count(tokens.len(), max_tokens));

    let mut start = 0;
    while start < tokens.len() {
        let end = (start + max_tokens).min(tokens.len());
        chunks.push(TextChunk {
            index: chunks.len(),
            tokens: start..end,
            text: tokenizer.decode(&tokens[start..end])?,
        });
        start = end;
    }

    debug!(
        "Split {} tokens into {} chunks (max {} tokens each)",
        tokens.len(),
        chunks.len(),
        max_tokens
    );

    Ok(chunks)
}
