use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::extractors::article::DEFAULT_MAX_IMAGES;
use crate::summarize::groq::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::NotesError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM completion service
    pub llm: LlmConfig,

    /// Video transcript settings
    pub transcript: TranscriptConfig,

    /// Article and image harvesting settings
    pub article: ArticleConfig,

    /// OCR settings
    pub ocr: OcrConfig,

    /// Web shell settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model used for summaries
    pub model: String,

    /// API key; the GROQ_API_KEY environment variable takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Transcript languages in order of preference
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    /// Maximum number of page images sent through OCR
    pub max_images: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path or name of the tesseract binary
    pub tesseract_path: String,

    /// Tesseract language (uses tesseract's default if not set)
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the web shell listens on
    pub bind: SocketAddr,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "hi".to_string()],
        }
    }
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            language: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("universal-notes").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(NotesError::InvalidConfig("llm.model must not be empty".into()).into());
        }

        if self.transcript.languages.is_empty() {
            return Err(NotesError::InvalidConfig(
                "transcript.languages must list at least one language".into(),
            )
            .into());
        }

        if self.article.max_images == 0 {
            return Err(
                NotesError::InvalidConfig("article.max_images must be at least 1".into()).into(),
            );
        }

        Ok(())
    }

    /// Resolve the API key: explicit value (CLI flag / environment) first, then the file
    pub fn api_key(&self, override_key: Option<&str>) -> Result<String, NotesError> {
        override_key
            .or(self.llm.api_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or(NotesError::MissingApiKey)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  LLM Endpoint: {}", self.llm.base_url);
        println!("  LLM Model: {}", self.llm.model);
        println!(
            "  API Key: {}",
            if self.llm.api_key.is_some() { "set in config file" } else { "from GROQ_API_KEY" }
        );
        println!("  Transcript Languages: {}", self.transcript.languages.join(", "));
        println!("  Max Images: {}", self.article.max_images);
        println!("  Tesseract: {}", self.ocr.tesseract_path);
        if let Some(language) = &self.ocr.language {
            println!("  OCR Language: {}", language);
        }
        println!("  Web Shell Address: {}", self.server.bind);
    }
}
