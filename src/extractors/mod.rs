use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod article;
pub mod ocr;
pub mod youtube;

use crate::Result;
use youtube::Transcript;

/// Which fetch path a URL is sent down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Video,
    Article,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Video => "video",
            SourceKind::Article => "article",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a URL. Plain, case-sensitive substring check with no URL parsing.
pub fn route_input(url: &str) -> SourceKind {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        SourceKind::Video
    } else {
        SourceKind::Article
    }
}

/// Result of fetching content for one URL.
///
/// `Empty` covers both "nothing there" and failures that are absorbed on purpose
/// (missing transcripts); callers report it as "no content".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Content(String),
    Empty { reason: String },
}

impl FetchOutcome {
    pub fn empty(reason: impl Into<String>) -> Self {
        FetchOutcome::Empty {
            reason: reason.into(),
        }
    }

    /// Wrap fetched text, treating a blank string as empty
    pub fn from_text(text: String, empty_reason: &str) -> Self {
        if text.trim().is_empty() {
            Self::empty(empty_reason)
        } else {
            FetchOutcome::Content(text)
        }
    }
}

/// Source of video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the preferred transcript for a video id
    async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript>;
}

/// Source of article text and the images embedded in the page
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Download and extract the main body text of a page
    async fn fetch_article_text(&self, url: &str) -> Result<String>;

    /// Absolute URLs of the first images referenced by the page
    async fn harvest_image_urls(&self, url: &str) -> Result<Vec<String>>;
}

/// Text recognition over remote images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognized text, trimmed. Returns an empty string on any failure.
    async fn recognize_url(&self, image_url: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_input_video_hosts() {
        assert_eq!(route_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), SourceKind::Video);
        assert_eq!(route_input("https://youtu.be/dQw4w9WgXcQ"), SourceKind::Video);
        assert_eq!(route_input("https://m.youtube.com/shorts/abc"), SourceKind::Video);
        // only the substring matters, not where it appears
        assert_eq!(route_input("https://example.com/?ref=youtube.com"), SourceKind::Video);
    }

    #[test]
    fn test_route_input_articles() {
        assert_eq!(route_input("https://example.com/article"), SourceKind::Article);
        assert_eq!(route_input("https://vimeo.com/12345"), SourceKind::Article);
        assert_eq!(route_input(""), SourceKind::Article);
        // case-sensitive
        assert_eq!(route_input("https://YOUTUBE.COM/watch?v=dQw4w9WgXcQ"), SourceKind::Article);
    }

    #[test]
    fn test_fetch_outcome_from_text() {
        assert_eq!(
            FetchOutcome::from_text("hello".to_string(), "blank"),
            FetchOutcome::Content("hello".to_string())
        );
        let empty = FetchOutcome::from_text("  \n".to_string(), "blank");
        assert_eq!(empty, FetchOutcome::empty("blank"));
    }
}
