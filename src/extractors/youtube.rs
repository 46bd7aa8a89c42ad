use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use super::TranscriptSource;
use crate::{NotesError, Result};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id pattern is valid")
});

// Self-closing elements come first so they never swallow the next element's body.
static TEXT_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text\b[^>]*/>|<text\b([^>]*)>(.*?)</text>"#)
        .expect("timed text pattern is valid")
});

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_]+)="([^"]*)""#).expect("attribute pattern is valid")
});

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Pull the 11-character video id out of a URL.
///
/// Matches after a `v=` marker or a `/`, first match wins. Anything that fits the
/// pattern is accepted, so `https://example.com/abcdefghijk` yields an id too.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Thumbnail for a video. Built blindly from the id; the image may not exist.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/0.jpg", video_id)
}

/// One timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A fetched transcript with its fragments in playback order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language_code: String,
    pub is_generated: bool,
    pub fragments: Vec<TranscriptFragment>,
}

impl Transcript {
    /// Fragment texts joined by single spaces
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A caption track advertised by the watch page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language: String,
    pub base_url: String,
    pub is_generated: bool,
}

/// All caption tracks available for a video
#[derive(Debug, Clone)]
pub struct TranscriptList {
    pub video_id: String,
    pub tracks: Vec<TranscriptTrack>,
}

impl TranscriptList {
    /// Read caption tracks from a parsed `ytInitialPlayerResponse`
    pub fn from_player_response(video_id: &str, player_response: &Value) -> Result<Self> {
        let Some(caption_tracks) = player_response
            .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
            .and_then(|tracks| tracks.as_array())
        else {
            if let Some(reason) = player_response
                .pointer("/playabilityStatus/reason")
                .and_then(|r| r.as_str())
            {
                tracing::debug!("Video {} is not playable: {}", video_id, reason);
            }
            return Err(NotesError::TranscriptsDisabled(video_id.to_string()).into());
        };

        let tracks = caption_tracks
            .iter()
            .filter_map(|track| {
                let base_url = track["baseUrl"].as_str()?.to_string();
                let language_code = track["languageCode"].as_str()?.to_string();
                let language = track
                    .pointer("/name/simpleText")
                    .or_else(|| track.pointer("/name/runs/0/text"))
                    .and_then(|name| name.as_str())
                    .unwrap_or(&language_code)
                    .to_string();

                Some(TranscriptTrack {
                    language_code,
                    language,
                    base_url,
                    is_generated: track["kind"].as_str() == Some("asr"),
                })
            })
            .collect();

        Ok(Self {
            video_id: video_id.to_string(),
            tracks,
        })
    }

    /// First manually authored track in language preference order
    pub fn find_manually_created(&self, languages: &[String]) -> Option<&TranscriptTrack> {
        self.find(languages, false)
    }

    /// First auto-generated track in language preference order
    pub fn find_generated(&self, languages: &[String]) -> Option<&TranscriptTrack> {
        self.find(languages, true)
    }

    fn find(&self, languages: &[String], generated: bool) -> Option<&TranscriptTrack> {
        languages.iter().find_map(|language| {
            self.tracks
                .iter()
                .find(|track| track.is_generated == generated && &track.language_code == language)
        })
    }
}

/// Locate and parse the player response JSON embedded in a watch page
fn extract_player_response(html: &str) -> Result<Value> {
    let start = html
        .find(PLAYER_RESPONSE_MARKER)
        .context("Watch page does not contain player data")?;
    let rest = &html[start + PLAYER_RESPONSE_MARKER.len()..];

    // The object is followed by arbitrary script text, so only read the first value.
    let player_response = serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()
        .context("Player data is empty")?
        .context("Failed to parse player data")?;

    Ok(player_response)
}

/// Parse timed-text XML into fragments, dropping empty ones
pub fn parse_timed_text(xml: &str) -> Vec<TranscriptFragment> {
    TEXT_ELEMENT_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let attributes = caps.get(1)?.as_str();
            let body = caps.get(2)?.as_str();

            let mut start = 0.0;
            let mut duration = 0.0;
            for attr in ATTRIBUTE_RE.captures_iter(attributes) {
                match &attr[1] {
                    "start" => start = attr[2].parse().unwrap_or(0.0),
                    "dur" => duration = attr[2].parse().unwrap_or(0.0),
                    _ => {}
                }
            }

            // XML escaping first, then the HTML escaping and inline markup inside it
            let unescaped = html_escape::decode_html_entities(body);
            let stripped = MARKUP_RE.replace_all(&unescaped, "");
            let text = html_escape::decode_html_entities(&stripped).into_owned();

            if text.trim().is_empty() {
                None
            } else {
                Some(TranscriptFragment {
                    text,
                    start,
                    duration,
                })
            }
        })
        .collect()
}

/// Transcript fetcher backed by the public watch page and timed-text endpoint
pub struct YoutubeTranscriptFetcher {
    client: Client,
    languages: Vec<String>,
    watch_url: String,
}

impl YoutubeTranscriptFetcher {
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            languages,
            watch_url: WATCH_URL.to_string(),
        }
    }

    /// Point the fetcher at a different watch endpoint
    pub fn with_watch_url(mut self, url: impl Into<String>) -> Self {
        self.watch_url = url.into();
        self
    }

    /// List every caption track the video offers
    pub async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList> {
        tracing::debug!("Listing transcripts for video: {}", video_id);

        let html = self
            .client
            .get(&self.watch_url)
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .context("Failed to fetch video page")?
            .error_for_status()?
            .text()
            .await
            .context("Failed to read video page")?;

        let player_response = extract_player_response(&html)?;
        TranscriptList::from_player_response(video_id, &player_response)
    }

    /// Download one caption track
    pub async fn fetch(&self, video_id: &str, track: &TranscriptTrack) -> Result<Transcript> {
        let url = track.base_url.replace("&fmt=srv3", "");

        let xml = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch transcript")?
            .error_for_status()?
            .text()
            .await
            .context("Failed to read transcript")?;

        let fragments = parse_timed_text(&xml);
        tracing::debug!("Parsed {} transcript fragments", fragments.len());

        Ok(Transcript {
            video_id: video_id.to_string(),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated,
            fragments,
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptFetcher {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript> {
        let list = self.list_transcripts(video_id).await?;

        let track = match list.find_manually_created(&self.languages) {
            Some(track) => track,
            None => {
                tracing::debug!("No manual transcript for {}, trying generated ones", video_id);
                list.find_generated(&self.languages).ok_or_else(|| {
                    NotesError::NoTranscriptFound {
                        video_id: video_id.to_string(),
                        languages: self.languages.clone(),
                    }
                })?
            }
        };

        tracing::info!(
            language = %track.language_code,
            generated = track.is_generated,
            "Fetching transcript for video: {}",
            video_id
        );
        self.fetch(video_id, track).await
    }
}
