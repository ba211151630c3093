pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, DEFAULT_MAX_CHUNK_TOKENS, DEFAULT_MODEL};
pub use error::{BoxError, LlamasumError};
pub type Result<T> = std::result::Result<T, LlamasumError>;
