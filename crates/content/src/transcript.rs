use async_trait::async_trait;
use llamasum_common::{LlamasumError, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::{flatten_segments, ExtractedText, TranscriptSegment};
use crate::youtube::{parse_video_id, VideoId};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const PREFERRED_LANGUAGE: &str = "en";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("text").expect("valid selector")
});

/// Backend that returns the timed captions of a video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_segments(&self, video_id: &VideoId) -> Result<Vec<TranscriptSegment>>;
}

/// Resolves a YouTube URL to flattened transcript text
#[derive(Clone)]
pub struct TranscriptExtractor {
    source: Arc<dyn TranscriptSource>,
}

impl TranscriptExtractor {
    pub fn new(source: Arc<dyn TranscriptSource>) -> Self {
        Self { source }
    }

    /// Parse the URL, fetch its captions and join them into one string
    pub async fn extract(&self, url: &str) -> Result<ExtractedText> {
        let video_id = parse_video_id(url)?;
        info!("Fetching transcript for video {}", video_id);

        let segments = self
            .source
            .fetch_segments(&video_id)
            .await
            .map_err(|e| match e {
                LlamasumError::Transcript { .. } => e,
                other => LlamasumError::transcript_with(video_id.as_str(), other),
            })?;

        debug!("Transcript has {} segments", segments.len());

        ExtractedText::new(flatten_segments(&segments))
            .map_err(|_| LlamasumError::transcript(video_id.as_str(), "transcript is empty"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
}

/// Scrapes caption tracks from the YouTube watch page
#[derive(Debug, Clone)]
pub struct YouTubeTranscriptClient {
    client: Client,
}

impl YouTubeTranscriptClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LlamasumError::fetch_with("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .header("Accept-Language", "en-US")
            .send()
            .await
            .map_err(|e| LlamasumError::fetch_with(format!("request to {} failed", url), e))?
            .error_for_status()
            .map_err(|e| LlamasumError::fetch_with("YouTube returned an error status", e))?
            .text()
            .await
            .map_err(|e| LlamasumError::fetch_with("Failed to read response body", e))
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptClient {
    async fn fetch_segments(&self, video_id: &VideoId) -> Result<Vec<TranscriptSegment>> {
        let html = self.get_text(&format!("{}{}", WATCH_URL, video_id)).await?;
        let tracks = parse_caption_tracks(&html)
            .map_err(|e| LlamasumError::transcript_with(video_id.as_str(), e))?;

        let track = select_track(&tracks)
            .ok_or_else(|| LlamasumError::transcript(video_id.as_str(), "no caption tracks available"))?;
        debug!("Using caption track '{}'", track.language_code);

        let xml = self.get_text(&track.base_url.replace("&fmt=srv3", "")).await?;
        Ok(parse_timedtext(&xml))
    }
}

/// Pull the caption track list out of the watch page's player response
fn parse_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(LlamasumError::extraction("YouTube is rate limiting requests"));
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(LlamasumError::extraction("video is unavailable"));
        }
        return Err(LlamasumError::extraction("transcripts are disabled for this video"));
    };

    let json = after
        .split_once(",\"videoDetails")
        .map(|(captions, _)| captions)
        .unwrap_or(after)
        .replace('\n', "");

    let captions: Captions = serde_json::from_str(&json)?;
    Ok(captions
        .player_captions_tracklist_renderer
        .map(|r| r.caption_tracks)
        .unwrap_or_default())
}

fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == PREFERRED_LANGUAGE)
        .or_else(|| {
            if !tracks.is_empty() {
                warn!("No English captions, falling back to first track");
            }
            tracks.first()
        })
}

/// Parse the timed-text XML document into segments
fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    let document = Html::parse_fragment(xml);

    document
        .select(&TEXT_SELECTOR)
        .filter_map(|el| {
            let raw: String = el.text().collect();
            if raw.is_empty() {
                return None;
            }
            let attr = |name: &str| {
                el.value()
                    .attr(name)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            Some(TranscriptSegment::new(
                decode_entities(&raw),
                attr("start"),
                attr("dur"),
            ))
        })
        .collect()
}

/// Captions arrive entity-escaped a second time inside the XML
fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, &str); 6] = [
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&nbsp;", " "),
        ("&amp;", "&"),
    ];

    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, replacement)| acc.replace(entity, replacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the given segments, or fails like a private video when `None`
    struct FakeSource(Option<Vec<TranscriptSegment>>);

    #[async_trait]
    impl TranscriptSource for FakeSource {
        async fn fetch_segments(&self, _video_id: &VideoId) -> Result<Vec<TranscriptSegment>> {
            self.0
                .clone()
                .ok_or_else(|| LlamasumError::fetch("video is private"))
        }
    }

    fn extractor(segments: Option<Vec<TranscriptSegment>>) -> TranscriptExtractor {
        TranscriptExtractor::new(Arc::new(FakeSource(segments)))
    }

    #[tokio::test]
    async fn test_extract_flattens_segments() {
        let extractor = extractor(Some(vec![
            TranscriptSegment::new("never gonna", 0.0, 1.0),
            TranscriptSegment::new("give you up", 1.0, 1.0),
        ]));

        let text = extractor.extract("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert_eq!(text.as_str(), "never gonna give you up");
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_a_transcript_error() {
        let extractor = extractor(Some(vec![]));
        let err = extractor.extract("https://www.youtube.com/feed").await.unwrap_err();
        assert!(matches!(err, LlamasumError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_wrapped_with_cause() {
        use std::error::Error;

        let extractor = extractor(None);
        let err = extractor.extract("https://youtu.be/abc123").await.unwrap_err();

        match &err {
            LlamasumError::Transcript { video_id, .. } => assert_eq!(video_id, "abc123"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.source().unwrap().to_string().contains("video is private"));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_an_error() {
        let extractor = extractor(Some(vec![]));
        let err = extractor.extract("https://youtu.be/abc123").await.unwrap_err();
        assert!(matches!(err, LlamasumError::Transcript { .. }));
    }

    #[test]
    fn test_parse_caption_tracks() {
        let html = r#"<script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=srv3","languageCode":"en"}]}},"videoDetails":{"videoId":"abc"}};</script>"#;

        let tracks = parse_caption_tracks(html).unwrap();
        assert_eq!(tracks.len(), 2);

        let chosen = select_track(&tracks).unwrap();
        assert_eq!(chosen.language_code, "en");
        assert_eq!(
            chosen.base_url.replace("&fmt=srv3", ""),
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );
    }

    #[test]
    fn test_parse_caption_tracks_disabled() {
        let html = r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{}}"#;
        let err = parse_caption_tracks(html).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_select_track_falls_back_to_first() {
        let tracks = vec![CaptionTrack {
            base_url: "https://example.com/fr".to_string(),
            language_code: "fr".to_string(),
        }];
        assert_eq!(select_track(&tracks).unwrap().language_code, "fr");
        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">it&amp;#39;s a</text><text start="2.6" dur="1">test &amp;amp; more</text><text start="3.6" dur="1"></text></transcript>"#;

        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "it's a");
        assert_eq!(segments[0].start, 0.5);
        assert_eq!(segments[0].duration, 2.1);
        assert_eq!(segments[1].text, "test & more");
    }
}
