use url::Url;

use crate::extractors::ocr::TesseractOcr;

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Format a character count in human-readable form
pub fn format_char_count(chars: usize) -> String {
    if chars < 1000 {
        format!("{} chars", chars)
    } else {
        format!("{:.1}k chars", chars as f64 / 1000.0)
    }
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Check if the current environment has the optional external tools
pub async fn check_dependencies(tesseract_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !TesseractOcr::new(tesseract_path, None).check_availability().await {
        missing.push(format!(
            "{} - required for reading text inside article images (OCR results will be empty)",
            tesseract_path
        ));
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_format_char_count() {
        assert_eq!(format_char_count(0), "0 chars");
        assert_eq!(format_char_count(999), "999 chars");
        assert_eq!(format_char_count(7000), "7.0k chars");
        assert_eq!(format_char_count(12345), "12.3k chars");
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://www.youtube.com/watch?v=123"),
            Some("youtube.com".to_string())
        );
        assert_eq!(extract_domain("https://docs.rs/tokio"), Some("docs.rs".to_string()));
        assert_eq!(extract_domain("invalid-url"), None);
    }

    #[tokio::test]
    async fn test_check_dependencies_reports_missing_tool() {
        let missing = check_dependencies("/nonexistent/tesseract-binary").await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("OCR"));
    }
}
