/// Boxed cause kept behind an error for diagnostics
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// llamasum error types
#[derive(Debug, thiserror::Error)]
pub enum LlamasumError {
    /// Malformed YouTube URL
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// Network/HTTP failure while fetching source content
    #[error("Error fetching text from the link: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// No article content could be located in the page
    #[error("Unable to extract content: {0}")]
    Extraction(String),

    /// Transcript retrieval failed
    #[error("Error fetching transcript for video {video_id}: {message}")]
    Transcript {
        video_id: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Chat backend failure
    #[error("Error generating response: {message}")]
    Generation {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Tokenizer load or decode failure
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Source resolved to zero tokens
    #[error("Nothing to summarize: the resolved content is empty")]
    NothingToSummarize,

    /// Pipeline was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LlamasumError {
    /// Create invalid URL error
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl(url.into())
    }

    /// Create fetch error without a typed cause
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch {
            message: msg.into(),
            source: None,
        }
    }

    /// Create fetch error wrapping the original cause
    pub fn fetch_with<E>(msg: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create extraction error
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create transcript error
    pub fn transcript(video_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transcript {
            video_id: video_id.into(),
            message: msg.into(),
            source: None,
        }
    }

    /// Wrap any failure raised while retrieving a transcript
    pub fn transcript_with(video_id: impl Into<String>, source: LlamasumError) -> Self {
        Self::Transcript {
            video_id: video_id.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create generation error without a typed cause
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation {
            message: msg.into(),
            source: None,
        }
    }

    /// Create generation error wrapping the original cause
    pub fn generation_with<E>(msg: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Generation {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create tokenizer error
    pub fn tokenizer<S: Into<String>>(msg: S) -> Self {
        Self::Tokenizer(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

// Process exit status for the command line front end
impl LlamasumError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::InvalidUrl(_) => 2,
            Self::Config(_) => 3,
            Self::Fetch { .. } | Self::Extraction(_) | Self::Transcript { .. } => 4,
            Self::NothingToSummarize => 5,
            Self::Generation { .. } => 6,
            Self::Cancelled => 130,
            Self::Tokenizer(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_transcript_error_keeps_cause() {
        let cause = LlamasumError::fetch("HTTP 404");
        let err = LlamasumError::transcript_with("abc123", cause);

        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("HTTP 404"));
        let source = err.source().expect("cause retained");
        assert!(source.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_generation_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = LlamasumError::generation_with("chat request failed", io);

        assert_eq!(err.to_string(), "Error generating response: chat request failed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("refused".to_string()));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(LlamasumError::invalid_input("empty").exit_code(), 2);
        assert_eq!(LlamasumError::fetch("down").exit_code(), 4);
        assert_eq!(LlamasumError::Cancelled.exit_code(), 130);
    }
}
