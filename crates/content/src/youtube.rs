//! YouTube URL parsing

use llamasum_common::{LlamasumError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)([^&?]+)")
        .expect("valid video URL pattern")
});

/// YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video id from a watch or short-link URL.
///
/// The match is anchored at the start of the URL; query parameters after
/// the id are ignored.
pub fn parse_video_id(url: &str) -> Result<VideoId> {
    VIDEO_URL
        .captures(url)
        .and_then(|caps| caps.get(4))
        .map(|m| VideoId(m.as_str().to_string()))
        .ok_or_else(|| LlamasumError::invalid_url(url))
}
