use serde::Serialize;
use std::fmt;

/// Classified user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Free-form text used as-is
    RawText(String),

    /// Web page to scrape for its main body
    ArticleUrl(String),

    /// YouTube video whose transcript is summarized
    YouTubeUrl(String),
}

/// Variant tag of an [`InputSource`], for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RawText,
    Article,
    YouTube,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RawText => "text",
            Self::Article => "article",
            Self::YouTube => "youtube",
        };
        f.write_str(name)
    }
}

impl InputSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::RawText(_) => SourceKind::RawText,
            Self::ArticleUrl(_) => SourceKind::Article,
            Self::YouTubeUrl(_) => SourceKind::YouTube,
        }
    }
}

/// Classify input by scheme prefix, then host substring.
///
/// Purely syntactic; every string maps to exactly one variant.
pub fn classify(input: &str) -> InputSource {
    if input.starts_with("http://") || input.starts_with("https://") {
        if input.contains("youtube.com") || input.contains("youtu.be") {
            InputSource::YouTubeUrl(input.to_string())
        } else {
            InputSource::ArticleUrl(input.to_string())
        }
    } else {
        InputSource::RawText(input.to_string())
    }
}
