use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::NotesReport;
use crate::utils::format_char_count;

pub mod pdf;

pub use pdf::{render_pdf, NOTES_FILE_NAME, PDF_MIME_TYPE};

/// Plain text: the notes as returned by the model, followed by a short source footer
pub fn format_as_text(report: &NotesReport) -> String {
    let mut out = String::new();
    out.push_str(report.summary.trim_end());
    out.push_str("\n\n");
    out.push_str(&format!("Source: {} ({})\n", report.url, report.kind));
    out.push_str(&format!(
        "Content: {}{}\n",
        format_char_count(report.content_chars),
        if report.truncated { ", truncated before summarizing" } else { "" }
    ));
    out
}

pub fn format_as_markdown(report: &NotesReport) -> String {
    let mut out = String::from("# Detailed Notes\n\n");

    if let Some(thumbnail) = &report.thumbnail_url {
        out.push_str(&format!("![Video thumbnail]({})\n\n", thumbnail));
    }

    out.push_str(report.summary.trim_end());
    out.push_str("\n\n---\n\n");
    out.push_str(&format!("*Source:* <{}>  \n", report.url));
    out.push_str(&format!(
        "*Generated:* {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

pub fn format_as_json(report: &NotesReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize notes")
}

fn render(report: &NotesReport, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_as_text(report),
        OutputFormat::Markdown => format_as_markdown(report),
        OutputFormat::Json => format_as_json(report)?,
    })
}

/// Save notes to file
pub async fn save_to_file(report: &NotesReport, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(report, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print notes to console
pub fn print_to_console(report: &NotesReport, format: &OutputFormat) -> Result<()> {
    println!("{}", render(report, format)?);
    Ok(())
}

/// Export the summary as a PDF document
pub async fn save_pdf(summary: &str, path: &Path) -> Result<()> {
    let bytes = render_pdf(summary)?;
    fs_err::write(path, bytes)?;
    Ok(())
}
