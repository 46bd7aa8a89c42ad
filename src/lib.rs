//! Universal Notes - turn a YouTube link or any article URL into AI-generated notes
//!
//! This library routes a URL to the right content source (video transcript or web
//! article plus OCR of its images), summarizes the aggregated text with a hosted
//! LLM and renders the bullet-point notes to the console, a web page or a PDF.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod shell;
pub mod summarize;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{route_input, FetchOutcome, SourceKind};
pub use pipeline::{NotesOutcome, NotesPipeline, NotesReport, PipelineStage};
pub use summarize::Summarizer;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the notes generator
#[derive(thiserror::Error, Debug)]
pub enum NotesError {
    #[error("No transcript found for video {video_id} in languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Article extraction failed: {0}")]
    ArticleExtractionFailed(String),

    #[error("Missing API key: set GROQ_API_KEY or llm.api_key in the config file")]
    MissingApiKey,

    #[error("Cannot export character {0:?}: outside the Latin-1 range")]
    Encoding(char),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
