//! Browser interface: one form page, a notes view and the PDF download.
//!
//! Each request runs the pipeline to completion before responding; nothing is
//! kept between requests except the pipeline itself.

use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::extractors::{route_input, youtube, SourceKind};
use crate::output::{render_pdf, NOTES_FILE_NAME, PDF_MIME_TYPE};
use crate::pipeline::{NotesOutcome, NotesPipeline};
use crate::Result;

pub const TITLE: &str = "Universal URL → Detailed Notes Generator";
pub const INVALID_URL_WARNING: &str = "Please enter a valid URL.";
pub const NO_CONTENT_MESSAGE: &str = "Could not extract content from this URL.";
pub const SUBMIT_LABEL: &str = "Get Detailed Notes";
pub const DOWNLOAD_LABEL: &str = "Download Notes as PDF";
pub const RESULTS_HEADING: &str = "Detailed Notes";

#[derive(Clone)]
pub struct ShellState {
    pipeline: Arc<NotesPipeline>,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PdfForm {
    #[serde(default)]
    pub summary: String,
}

pub fn router(pipeline: Arc<NotesPipeline>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/notes", post(generate_notes))
        .route("/notes.pdf", post(download_pdf))
        .with_state(ShellState { pipeline })
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr, pipeline: Arc<NotesPipeline>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web shell listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

async fn index(Query(query): Query<IndexQuery>) -> Html<String> {
    let url = query.url.unwrap_or_default();
    let mut body = url_form(&url);
    body.push_str(&thumbnail_preview(&url));
    page(&body)
}

async fn generate_notes(
    State(state): State<ShellState>,
    Form(form): Form<NotesForm>,
) -> Html<String> {
    let url = form.url.trim();
    let mut body = url_form(url);

    if url.is_empty() {
        body.push_str(&alert("warning", INVALID_URL_WARNING));
        return page(&body);
    }

    body.push_str(&thumbnail_preview(url));

    match state.pipeline.run(url).await {
        Ok(outcome) => {
            for notice in outcome.notices() {
                body.push_str(&alert("error", notice));
            }

            match outcome {
                NotesOutcome::Summary(report) => {
                    body.push_str(&format!(
                        "<h2>{}</h2>\n<pre class=\"notes\">{}</pre>\n",
                        RESULTS_HEADING,
                        encode_text(&report.summary)
                    ));
                    body.push_str(&format!(
                        "<form method=\"post\" action=\"/notes.pdf\">\
                         <input type=\"hidden\" name=\"summary\" value=\"{}\">\
                         <button type=\"submit\">{}</button></form>\n",
                        encode_double_quoted_attribute(&report.summary),
                        DOWNLOAD_LABEL
                    ));
                }
                NotesOutcome::NoContent { .. } => {
                    body.push_str(&alert("error", NO_CONTENT_MESSAGE));
                }
            }
        }
        Err(e) => {
            body.push_str(&alert("error", &format!("Error: {:#}", e)));
        }
    }

    page(&body)
}

async fn download_pdf(Form(form): Form<PdfForm>) -> Response {
    // browsers submit form newlines as CRLF
    let summary = form.summary.replace("\r\n", "\n");

    match render_pdf(&summary) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, PDF_MIME_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", NOTES_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "PDF export failed");
            (StatusCode::UNPROCESSABLE_ENTITY, format!("PDF export failed: {}", e)).into_response()
        }
    }
}

fn url_form(url: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/notes\">\
         <label for=\"url\">Enter any URL (YouTube / Article / Blog / News)</label>\
         <input id=\"url\" name=\"url\" type=\"text\" value=\"{}\">\
         <button type=\"submit\">{}</button></form>\n",
        encode_double_quoted_attribute(url),
        SUBMIT_LABEL
    )
}

/// Thumbnail for video URLs with a recognizable id, empty otherwise
fn thumbnail_preview(url: &str) -> String {
    if route_input(url) != SourceKind::Video {
        return String::new();
    }

    match youtube::extract_video_id(url) {
        Some(video_id) => format!(
            "<img class=\"thumbnail\" src=\"{}\" alt=\"Video thumbnail\">\n",
            encode_double_quoted_attribute(&youtube::thumbnail_url(&video_id))
        ),
        None => String::new(),
    }
}

fn alert(level: &str, message: &str) -> String {
    format!("<p class=\"{}\">{}</p>\n", level, encode_text(message))
}

fn page(body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>body{{max-width:60rem;margin:2rem auto;font-family:sans-serif}}\
         .warning{{color:#8a6d3b}}.error{{color:#a94442}}\
         pre.notes{{white-space:pre-wrap}}.thumbnail{{max-width:100%}}</style></head>\n\
         <body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = TITLE,
        body = body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::youtube::{Transcript, TranscriptFragment};
    use crate::extractors::{MockArticleSource, MockTextRecognizer, MockTranscriptSource};
    use crate::summarize::{MockCompletionClient, Summarizer};
    use crate::NotesError;

    fn pipeline(
        transcripts: MockTranscriptSource,
        articles: MockArticleSource,
        summary: &'static str,
    ) -> Arc<NotesPipeline> {
        let mut client = MockCompletionClient::new();
        client.expect_complete().returning(move |_| Ok(summary.to_string()));

        Arc::new(NotesPipeline::with_sources(
            Box::new(transcripts),
            Box::new(articles),
            Box::new(MockTextRecognizer::new()),
            Summarizer::new(Box::new(client), "m"),
        ))
    }

    fn idle_pipeline() -> Arc<NotesPipeline> {
        pipeline(MockTranscriptSource::new(), MockArticleSource::new(), "")
    }

    async fn spawn_shell(pipeline: Arc<NotesPipeline>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router(pipeline)).await.unwrap();
        });
        base
    }

    async fn post_notes(base: &str, url: &str) -> String {
        reqwest::Client::new()
            .post(format!("{}/notes", base))
            .form(&[("url", url)])
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form_and_preview() {
        let base = spawn_shell(idle_pipeline()).await;

        let html = reqwest::get(format!("{}/", base)).await.unwrap().text().await.unwrap();
        assert!(html.contains(TITLE));
        assert!(html.contains(SUBMIT_LABEL));
        assert!(!html.contains("thumbnail\" src"));

        let html = reqwest::get(format!("{}/?url=https://youtu.be/ABCDEFGHIJK", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("https://img.youtube.com/vi/ABCDEFGHIJK/0.jpg"));
    }

    #[tokio::test]
    async fn test_blank_url_shows_warning() {
        let mut transcripts = MockTranscriptSource::new();
        transcripts.expect_fetch_transcript().never();
        let base = spawn_shell(pipeline(transcripts, MockArticleSource::new(), "")).await;

        let html = post_notes(&base, "   ").await;
        assert!(html.contains(INVALID_URL_WARNING));
        assert!(!html.contains("<h2>Detailed Notes</h2>"));
        assert!(!html.contains("class=\"notes\""));
    }

    #[tokio::test]
    async fn test_video_notes_are_rendered_escaped() {
        let mut transcripts = MockTranscriptSource::new();
        transcripts.expect_fetch_transcript().returning(|id| {
            Ok(Transcript {
                video_id: id.to_string(),
                language_code: "en".into(),
                is_generated: true,
                fragments: vec![TranscriptFragment {
                    text: "Hello world".into(),
                    start: 0.0,
                    duration: 1.0,
                }],
            })
        });
        let summary = "- <b>point</b> & more";
        let base = spawn_shell(pipeline(transcripts, MockArticleSource::new(), summary)).await;

        let html = post_notes(&base, "https://youtu.be/ABCDEFGHIJK").await;
        assert!(html.contains("<h2>Detailed Notes</h2>"));
        assert!(html.contains("- &lt;b&gt;point&lt;/b&gt; &amp; more"));
        assert!(html.contains(DOWNLOAD_LABEL));
        assert!(html.contains("https://img.youtube.com/vi/ABCDEFGHIJK/0.jpg"));
    }

    #[tokio::test]
    async fn test_missing_transcript_shows_notice_and_no_content() {
        let mut transcripts = MockTranscriptSource::new();
        transcripts
            .expect_fetch_transcript()
            .returning(|id| Err(NotesError::TranscriptsDisabled(id.to_string()).into()));
        let base = spawn_shell(pipeline(transcripts, MockArticleSource::new(), "")).await;

        let html = post_notes(&base, "https://www.youtube.com/watch?v=ABCDEFGHIJK").await;
        assert!(html.contains("Transcript Error: Transcripts are disabled"));
        assert!(html.contains(NO_CONTENT_MESSAGE));
        assert!(!html.contains(DOWNLOAD_LABEL));
    }

    #[tokio::test]
    async fn test_blank_summary_shows_no_content() {
        let mut articles = MockArticleSource::new();
        articles
            .expect_fetch_article_text()
            .returning(|_| Ok("Some article body".to_string()));
        articles.expect_harvest_image_urls().returning(|_| Ok(Vec::new()));
        let base = spawn_shell(pipeline(MockTranscriptSource::new(), articles, " \n ")).await;

        let html = post_notes(&base, "https://example.com/article").await;
        assert!(html.contains(NO_CONTENT_MESSAGE));
        assert!(!html.contains(DOWNLOAD_LABEL));
        assert!(!html.contains("class=\"notes\""));
    }

    #[tokio::test]
    async fn test_article_failure_is_reported_on_the_page() {
        let mut articles = MockArticleSource::new();
        articles
            .expect_fetch_article_text()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let base = spawn_shell(pipeline(MockTranscriptSource::new(), articles, "")).await;

        let html = post_notes(&base, "https://example.com/article").await;
        assert!(html.contains("Error: connection refused"));
    }

    #[tokio::test]
    async fn test_pdf_download_headers() {
        let base = spawn_shell(idle_pipeline()).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/notes.pdf", base))
            .form(&[("summary", "- one\n- two")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/pdf");
        assert_eq!(
            resp.headers()["content-disposition"],
            "attachment; filename=\"notes.pdf\""
        );
        assert!(resp.bytes().await.unwrap().starts_with(b"%PDF"));

        let resp = client
            .post(format!("{}/notes.pdf", base))
            .form(&[("summary", "• not latin-1")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);
    }
}
