use async_trait::async_trait;
use llamasum_common::{LlamasumError, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::types::ExtractedText;

/// Main-content selectors, tried in order
static CONTENT_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    ["article", "div.article-body", "div.entry-content"]
        .into_iter()
        .map(|css| {
            let selector = Selector::parse(css).expect("valid selector");
            (css, selector)
        })
        .collect()
});

/// Anything that can turn an article URL into text
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_article(&self, url: &str) -> Result<ExtractedText>;
}

/// Fetches a page over HTTP and pulls out its main body
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    /// Create extractor with its own HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlamasumError::fetch_with("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    /// GET the page body; any transport failure or non-2xx status is fatal
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!("Fetching article: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LlamasumError::fetch_with(format!("request to {} failed", url), e))?
            .error_for_status()
            .map_err(|e| LlamasumError::fetch_with(format!("{} returned an error status", url), e))?;

        let html = response
            .text()
            .await
            .map_err(|e| LlamasumError::fetch_with("Failed to read response body", e))?;

        debug!("Fetched {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[async_trait]
impl ArticleSource for ArticleExtractor {
    async fn fetch_article(&self, url: &str) -> Result<ExtractedText> {
        let html = self.fetch_html(url).await?;
        let text = extract_article_text(&html)?;
        info!("Extracted article text - Length: {} chars", text.as_str().len());
        Ok(text)
    }
}

/// Locate the main content of a page and return its text.
///
/// Text nodes of the first matching element are joined with single spaces.
pub fn extract_article_text(html: &str) -> Result<ExtractedText> {
    let document = Html::parse_document(html);

    for (css, selector) in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            debug!("Article content matched selector '{}'", css);
            let text = element.text().collect::<Vec<_>>().join(" ");
            return ExtractedText::new(text)
                .map_err(|_| LlamasumError::extraction(format!("'{}' element has no text", css)));
        }
    }

    Err(LlamasumError::extraction("no article content found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_article_element() {
        let html = r#"<html><body>
            <div class="entry-content">sidebar copy</div>
            <article><h1>Title</h1><p>Body text</p></article>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert!(text.as_str().contains("Title"));
        assert!(text.as_str().contains("Body text"));
        assert!(!text.as_str().contains("sidebar"));
    }

    #[test]
    fn test_article_body_before_entry_content() {
        let html = r#"<body>
            <div class="entry-content">second choice</div>
            <div class="article-body">first choice</div>
        </body>"#;

        assert_eq!(extract_article_text(html).unwrap().as_str(), "first choice");
    }

    #[test]
    fn test_falls_back_to_entry_content() {
        let html = r#"<html><body><nav>menu</nav>
            <div class="entry-content"><p>Only</p><p>content</p></div>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text.as_str(), "Only content");
    }

    #[test]
    fn test_text_nodes_joined_with_spaces() {
        let html = "<article><b>one</b><i>two</i>three</article>";
        assert_eq!(extract_article_text(html).unwrap().as_str(), "one two three");
    }

    #[test]
    fn test_no_selector_matches() {
        let html = "<html><body><div class=\"content\">text</div></body></html>";
        let err = extract_article_text(html).unwrap_err();
        assert!(matches!(err, LlamasumError::Extraction(_)));
        assert!(err.to_string().contains("no article content found"));
    }

    #[test]
    fn test_empty_article_is_an_error() {
        let html = "<article>   </article>";
        assert!(matches!(
            extract_article_text(html),
            Err(LlamasumError::Extraction(_))
        ));
    }
}
