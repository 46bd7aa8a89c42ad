use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod groq;

use crate::utils::truncate_chars;
use crate::Result;

/// Content beyond this many characters is dropped before summarizing
pub const MAX_INPUT_CHARS: usize = 7000;

/// Low temperature keeps the note phrasing stable between runs
pub const TEMPERATURE: f32 = 0.3;

pub const SYSTEM_PROMPT: &str = include_str!("./prompts/system.txt");

pub const USER_PROMPT_PREFIX: &str = "Generate notes in bullet points:\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A chat-completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Text of the first completion choice
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Turns aggregated content into bullet-point notes
pub struct Summarizer {
    client: Box<dyn CompletionClient>,
    model: String,
}

impl Summarizer {
    pub fn new(client: Box<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn build_request(&self, content: &str) -> CompletionRequest {
        let content = truncate_chars(content, MAX_INPUT_CHARS);

        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("{}{}", USER_PROMPT_PREFIX, content)),
            ],
            temperature: TEMPERATURE,
        }
    }

    pub async fn summarize(&self, content: &str) -> Result<String> {
        let request = self.build_request(content);
        tracing::info!(
            model = %self.model,
            input_chars = content.chars().count().min(MAX_INPUT_CHARS),
            "Requesting summary"
        );

        self.client
            .complete(request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer_expecting(expected_content: String) -> Summarizer {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(move |request| request.messages[1].content == expected_content)
            .times(1)
            .returning(|_| Ok("- note".to_string()));
        Summarizer::new(Box::new(client), "test-model")
    }

    #[test]
    fn test_build_request_shape() {
        let summarizer = Summarizer::new(
            Box::new(MockCompletionClient::new()),
            "llama-3.1-8b-instant",
        );
        let request = summarizer.build_request("Hello world");

        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("250–300 words"));
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "Generate notes in bullet points:\nHello world");
    }

    #[test]
    fn test_request_serializes_like_openai() {
        let summarizer = Summarizer::new(Box::new(MockCompletionClient::new()), "m");
        let json = serde_json::to_value(summarizer.build_request("x")).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["model"], "m");
    }

    #[tokio::test]
    async fn test_long_content_is_truncated() {
        let content = "a".repeat(MAX_INPUT_CHARS + 500);
        let expected = format!("{}{}", USER_PROMPT_PREFIX, "a".repeat(MAX_INPUT_CHARS));

        let summary = summarizer_expecting(expected).summarize(&content).await.unwrap();
        assert_eq!(summary, "- note");
    }

    #[tokio::test]
    async fn test_short_content_is_sent_unmodified() {
        let content = "é".repeat(MAX_INPUT_CHARS);
        let expected = format!("{}{}", USER_PROMPT_PREFIX, content);

        summarizer_expecting(expected).summarize(&content).await.unwrap();
    }

    #[tokio::test]
    async fn test_completion_errors_propagate() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_| Err(anyhow::anyhow!("rate limited")));
        let summarizer = Summarizer::new(Box::new(client), "m");

        let err = summarizer.summarize("content").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }
}
