use crate::error::LlamasumError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default chat model served by Ollama
pub const DEFAULT_MODEL: &str = "llama3:8b";

/// Default token budget per chunk
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 2000;

/// llamasum application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Chat model name
    pub llm_model: String,

    /// Maximum tokens per chunk
    pub max_chunk_tokens: usize,

    /// Timeout for article and transcript fetches (seconds)
    pub fetch_timeout_secs: u64,

    /// Timeout for chat calls (seconds)
    pub llm_timeout_secs: u64,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            fetch_timeout_secs: 30,
            llm_timeout_secs: 300,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, LlamasumError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            llm_model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            max_chunk_tokens: Self::get_env_parsed("MAX_CHUNK_TOKENS")?
                .unwrap_or(defaults.max_chunk_tokens),
            fetch_timeout_secs: Self::get_env_parsed("FETCH_TIMEOUT_SECS")?
                .unwrap_or(defaults.fetch_timeout_secs),
            llm_timeout_secs: Self::get_env_parsed("LLM_TIMEOUT_SECS")?
                .unwrap_or(defaults.llm_timeout_secs),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse a numeric environment variable, rejecting malformed values
    fn get_env_parsed<T>(key: &str) -> Result<Option<T>, LlamasumError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match std::env::var(key) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| LlamasumError::config(format!("Invalid {}: {} ({})", key, raw, e))),
            Err(_) => Ok(None),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), LlamasumError> {
        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(LlamasumError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        if self.llm_model.trim().is_empty() {
            return Err(LlamasumError::config("LLM model name cannot be empty"));
        }

        if self.max_chunk_tokens == 0 {
            return Err(LlamasumError::config("Chunk token budget cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm_model, "llama3:8b");
        assert_eq!(config.max_chunk_tokens, 2000);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.max_chunk_tokens = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.ollama_base_url = "localhost:11434".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.llm_model = "  ".to_string();
        assert!(invalid_config.validate().is_err());
    }
}
