use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::io::Cursor;
use url::Url;

use super::ArticleSource;
use crate::{NotesError, Result};

/// Separator between article text and the text recovered from its images
pub const IMAGE_TEXT_HEADER: &str = "\n\nImportant Text from Images:\n";

/// Default number of images read from a page
pub const DEFAULT_MAX_IMAGES: usize = 3;

/// Article extractor for generic web pages
pub struct WebArticleSource {
    client: Client,
    max_images: usize,
}

impl WebArticleSource {
    pub fn new(max_images: usize) -> Self {
        Self {
            client: Client::new(),
            max_images,
        }
    }

    async fn download(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .header(
                reqwest::header::USER_AGENT,
                "Mozilla/5.0 (compatible; universal-notes/0.1)",
            )
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))
    }
}

#[async_trait]
impl ArticleSource for WebArticleSource {
    async fn fetch_article_text(&self, url: &str) -> Result<String> {
        let parsed_url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;

        tracing::info!("Downloading article: {}", url);
        let response = self.download(url).await?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to download article: HTTP {}", response.status());
        }
        let body = response.bytes().await.context("Failed to read article body")?;

        let mut cursor = Cursor::new(body.as_ref());
        let product = readability::extractor::extract(&mut cursor, &parsed_url)
            .map_err(|e| NotesError::ArticleExtractionFailed(e.to_string()))?;

        tracing::debug!("Extracted {} characters of article text", product.text.len());
        Ok(product.text)
    }

    async fn harvest_image_urls(&self, url: &str) -> Result<Vec<String>> {
        let base = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;

        // Whatever body comes back is scanned, error pages included.
        let html = self
            .download(url)
            .await?
            .text()
            .await
            .context("Failed to read page body")?;

        let images = harvest_image_urls_from_html(&html, &base, self.max_images);
        tracing::debug!("Found {} image(s) on {}", images.len(), url);
        Ok(images)
    }
}

/// Resolve the first `limit` usable `<img src>` values in document order.
///
/// Elements without a `src`, with an empty one, or with one that cannot be
/// resolved against `base` are skipped and do not count toward the limit.
pub fn harvest_image_urls_from_html(html: &str, base: &Url, limit: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .filter_map(|src| base.join(src).ok())
        .take(limit)
        .map(String::from)
        .collect()
}

/// Article text followed by the header and each OCR result on its own line
pub fn assemble_document(article_text: &str, ocr_texts: &[String]) -> String {
    let mut document = String::with_capacity(
        article_text.len()
            + IMAGE_TEXT_HEADER.len()
            + ocr_texts.iter().map(|t| t.len() + 1).sum::<usize>(),
    );
    document.push_str(article_text);
    document.push_str(IMAGE_TEXT_HEADER);
    for text in ocr_texts {
        document.push('\n');
        document.push_str(text);
    }
    document
}
