use llamasum_common::{LlamasumError, Result};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Token id produced by a [`Tokenizer`]
pub type TokenId = u32;

/// Deterministic encode/decode pair used for chunking
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<TokenId>;

    fn decode(&self, tokens: &[TokenId]) -> Result<String>;
}

/// GPT-2 byte-level BPE (the `r50k_base` vocabulary)
pub struct Gpt2Tokenizer {
    bpe: CoreBPE,
}

impl Gpt2Tokenizer {
    /// Load the embedded GPT-2 vocabulary
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::r50k_base()
            .map_err(|e| LlamasumError::tokenizer(format!("Failed to load GPT-2 vocabulary: {}", e)))?;
        debug!("GPT-2 tokenizer loaded");
        Ok(Self { bpe })
    }
}

impl Tokenizer for Gpt2Tokenizer {
    fn encode(&self, text: &str) -> Vec<TokenId> {
        self.bpe.encode_ordinary(text)
    }

    /// Bytes of a window cut inside a multi-byte character become U+FFFD
    fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        let bytes: Vec<u8> = self.bpe._decode_native_and_split(tokens.to_vec()).flatten().collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt2_round_trip() {
        let tokenizer = Gpt2Tokenizer::new().unwrap();
        let text = "The quick brown fox jumps over the lazy dog.";

        let tokens = tokenizer.encode(text);
        assert!(!tokens.is_empty());
        assert_eq!(tokenizer.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_gpt2_empty_text() {
        let tokenizer = Gpt2Tokenizer::new().unwrap();
        assert!(tokenizer.encode("").is_empty());
        assert_eq!(tokenizer.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_gpt2_split_character_decodes_lossily() {
        let tokenizer = Gpt2Tokenizer::new().unwrap();
        let tokens = tokenizer.encode("🎉");
        assert!(tokens.len() > 1);

        let head = tokenizer.decode(&tokens[..1]).unwrap();
        assert!(head.contains('\u{FFFD}'));
        assert_eq!(tokenizer.decode(&tokens).unwrap(), "🎉");
    }

    #[test]
    fn test_gpt2_repeated_word_is_one_token_each() {
        let tokenizer = Gpt2Tokenizer::new().unwrap();
        let text = format!("a{}", " a".repeat(9));
        assert_eq!(tokenizer.encode(&text).len(), 10);
    }
}
