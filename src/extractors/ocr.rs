use anyhow::Context;
use async_trait::async_trait;
use image::ImageFormat;
use reqwest::Client;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::TextRecognizer;
use crate::Result;

/// OCR backed by the `tesseract` command line tool
pub struct TesseractOcr {
    client: Client,
    tesseract_path: String,
    language: Option<String>,
}

impl TesseractOcr {
    pub fn new(tesseract_path: impl Into<String>, language: Option<String>) -> Self {
        Self {
            client: Client::new(),
            tesseract_path: tesseract_path.into(),
            language,
        }
    }

    /// Check if tesseract is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.tesseract_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn download_image(&self, image_url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(image_url)
            .send()
            .await
            .context("Failed to download image")?
            .bytes()
            .await
            .context("Failed to read image body")?;
        Ok(bytes.to_vec())
    }

    /// Run tesseract on an image file and return its trimmed stdout
    async fn run_tesseract(&self, image_path: &Path) -> Result<String> {
        let mut command = Command::new(&self.tesseract_path);
        command.arg(image_path).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }

        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.tesseract_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed: {}", error.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn try_recognize(&self, image_url: &str) -> Result<String> {
        let bytes = self.download_image(image_url).await?;

        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let image_path = temp_dir.path().join("image.png");

        // Decoding doubles as validation: anything tesseract sees is a clean PNG.
        let png_path = image_path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let image = image::load_from_memory(&bytes).context("Failed to decode image")?;
            image
                .save_with_format(&png_path, ImageFormat::Png)
                .context("Failed to write image")?;
            Ok(())
        })
        .await
        .context("Image decoding task failed")??;

        self.run_tesseract(&image_path).await
    }
}

#[async_trait]
impl TextRecognizer for TesseractOcr {
    async fn recognize_url(&self, image_url: &str) -> String {
        match self.try_recognize(image_url).await {
            Ok(text) => {
                tracing::debug!("Recognized {} characters from {}", text.len(), image_url);
                text
            }
            Err(e) => {
                tracing::debug!("OCR skipped for {}: {:#}", image_url, e);
                String::new()
            }
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", None)
    }
}
