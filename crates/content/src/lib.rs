//! llamasum content resolution
//!
//! Input classification and source-specific text extraction

pub mod article;
pub mod source;
pub mod transcript;
pub mod types;
pub mod youtube;

// Re-export main types
pub use article::{extract_article_text, ArticleExtractor, ArticleSource};
pub use source::{classify, InputSource, SourceKind};
pub use transcript::{TranscriptExtractor, TranscriptSource, YouTubeTranscriptClient};
pub use types::{flatten_segments, ExtractedText, TranscriptSegment};
pub use youtube::{parse_video_id, VideoId};
