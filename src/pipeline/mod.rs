use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::extractors::article::{assemble_document, WebArticleSource};
use crate::extractors::ocr::TesseractOcr;
use crate::extractors::youtube::{self, YoutubeTranscriptFetcher};
use crate::extractors::{
    route_input, ArticleSource, FetchOutcome, SourceKind, TextRecognizer, TranscriptSource,
};
use crate::summarize::groq::GroqClient;
use crate::summarize::{Summarizer, MAX_INPUT_CHARS};

/// Where a pipeline run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    Routing,
    Fetching,
    Aggregating,
    Summarizing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn message(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "Waiting for a URL",
            PipelineStage::Routing => "Routing URL...",
            PipelineStage::Fetching => "Fetching content...",
            PipelineStage::Aggregating => "Reading text from images...",
            PipelineStage::Summarizing => "Agent is reading and summarizing...",
            PipelineStage::Done => "Notes ready",
            PipelineStage::Failed => "Failed",
        }
    }
}

/// Notes produced for one URL
#[derive(Debug, Clone, Serialize)]
pub struct NotesReport {
    pub url: String,
    pub kind: SourceKind,
    pub video_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub summary: String,
    /// Length of the aggregated content in characters, before truncation
    pub content_chars: usize,
    pub truncated: bool,
    pub notices: Vec<String>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Result of a pipeline run that did not fail outright
#[derive(Debug, Clone)]
pub enum NotesOutcome {
    Summary(NotesReport),
    NoContent {
        kind: SourceKind,
        reason: String,
        notices: Vec<String>,
    },
}

impl NotesOutcome {
    pub fn notices(&self) -> &[String] {
        match self {
            NotesOutcome::Summary(report) => &report.notices,
            NotesOutcome::NoContent { notices, .. } => notices,
        }
    }
}

/// URL → content → notes pipeline. Runs strictly one step at a time.
pub struct NotesPipeline {
    transcripts: Box<dyn TranscriptSource>,
    articles: Box<dyn ArticleSource>,
    ocr: Box<dyn TextRecognizer>,
    summarizer: Summarizer,
}

impl NotesPipeline {
    /// Build the production pipeline from configuration
    pub fn new(config: &Config, api_key: String) -> Self {
        let completion_client = GroqClient::new(api_key).with_base_url(config.llm.base_url.clone());

        Self::with_sources(
            Box::new(YoutubeTranscriptFetcher::new(config.transcript.languages.clone())),
            Box::new(WebArticleSource::new(config.article.max_images)),
            Box::new(TesseractOcr::new(
                config.ocr.tesseract_path.clone(),
                config.ocr.language.clone(),
            )),
            Summarizer::new(Box::new(completion_client), config.llm.model.clone()),
        )
    }

    pub fn with_sources(
        transcripts: Box<dyn TranscriptSource>,
        articles: Box<dyn ArticleSource>,
        ocr: Box<dyn TextRecognizer>,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            transcripts,
            articles,
            ocr,
            summarizer,
        }
    }

    pub async fn run(&self, url: &str) -> Result<NotesOutcome> {
        self.run_with_progress(url, |_| {}).await
    }

    /// Run the pipeline, reporting each stage to `on_stage`
    pub async fn run_with_progress<F>(&self, url: &str, on_stage: F) -> Result<NotesOutcome>
    where
        F: Fn(PipelineStage) + Send + Sync,
    {
        let result = self.execute(url, &on_stage).await;
        match &result {
            Ok(_) => on_stage(PipelineStage::Done),
            Err(e) => {
                tracing::error!(error = %e, "Pipeline failed for {}", url);
                on_stage(PipelineStage::Failed);
            }
        }
        result
    }

    async fn execute<F>(&self, url: &str, on_stage: &F) -> Result<NotesOutcome>
    where
        F: Fn(PipelineStage) + Send + Sync,
    {
        on_stage(PipelineStage::Routing);
        let kind = route_input(url);
        tracing::info!("Routing {} as {}", url, kind);

        let mut notices = Vec::new();
        let video_id = match kind {
            SourceKind::Video => youtube::extract_video_id(url),
            SourceKind::Article => None,
        };

        on_stage(PipelineStage::Fetching);
        let outcome = match kind {
            SourceKind::Video => self.fetch_video(video_id.as_deref(), &mut notices).await,
            SourceKind::Article => self.fetch_article(url, on_stage).await?,
        };

        let content = match outcome {
            FetchOutcome::Content(content) => content,
            FetchOutcome::Empty { reason } => {
                tracing::warn!("No content for {}: {}", url, reason);
                return Ok(NotesOutcome::NoContent {
                    kind,
                    reason,
                    notices,
                });
            }
        };

        on_stage(PipelineStage::Summarizing);
        let content_chars = content.chars().count();
        let summary = self.summarizer.summarize(&content).await?;

        if summary.trim().is_empty() {
            tracing::warn!("Model returned an empty summary for {}", url);
            return Ok(NotesOutcome::NoContent {
                kind,
                reason: "model returned an empty summary".to_string(),
                notices,
            });
        }

        Ok(NotesOutcome::Summary(NotesReport {
            url: url.to_string(),
            kind,
            thumbnail_url: video_id.as_deref().map(youtube::thumbnail_url),
            video_id,
            summary,
            content_chars,
            truncated: content_chars > MAX_INPUT_CHARS,
            notices,
            generated_at: chrono::Utc::now(),
        }))
    }

    /// Transcript path. Every failure here becomes an empty outcome plus a notice.
    async fn fetch_video(&self, video_id: Option<&str>, notices: &mut Vec<String>) -> FetchOutcome {
        let Some(video_id) = video_id else {
            return FetchOutcome::empty("no video id in URL");
        };

        match self.transcripts.fetch_transcript(video_id).await {
            Ok(transcript) => FetchOutcome::from_text(transcript.text(), "transcript is empty"),
            Err(e) => {
                tracing::error!(error = %e, "Transcript fetch failed for {}", video_id);
                notices.push(format!("Transcript Error: {}", e));
                FetchOutcome::empty(e.to_string())
            }
        }
    }

    /// Article path: body text plus OCR of the first page images, one image at a time
    async fn fetch_article<F>(&self, url: &str, on_stage: &F) -> Result<FetchOutcome>
    where
        F: Fn(PipelineStage) + Send + Sync,
    {
        let text = self.articles.fetch_article_text(url).await?;
        let image_urls = self.articles.harvest_image_urls(url).await?;

        on_stage(PipelineStage::Aggregating);
        let mut ocr_texts = Vec::with_capacity(image_urls.len());
        for image_url in &image_urls {
            ocr_texts.push(self.ocr.recognize_url(image_url).await);
        }

        // The header is always present, so this path never comes back empty.
        Ok(FetchOutcome::Content(assemble_document(&text, &ocr_texts)))
    }
}
