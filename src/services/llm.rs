//! Azure OpenAI chat completions client

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{generator::{GenerateRequest, WorkoutGenerator}, prompt::build_prompt};
use crate::config::LlmSettings;

const API_VERSION: &str = "2024-08-01-preview";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("Workout generation is not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned an empty workout")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Generator backed by an Azure OpenAI deployment
pub struct AzureOpenAiGenerator {
    client: Client,
    settings: LlmSettings,
}

impl AzureOpenAiGenerator {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.settings.endpoint, self.settings.model, API_VERSION
        )
    }

    /// Send a single user message and return the reply text
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_completion_tokens: self.settings.max_tokens,
        };

        debug!("Requesting workout from deployment {}", self.settings.model);
        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(LlmError::Api(error.error.message));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let reply: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyReply)?;

        info!("Received workout reply ({} chars)", content.len());
        Ok(content)
    }
}

impl WorkoutGenerator for AzureOpenAiGenerator {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(async move { self.complete(&build_prompt(request)).await })
    }
}

/// Generator used when no model is configured; every request fails and the
/// caller falls back to a default workout
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerator;

impl WorkoutGenerator for UnconfiguredGenerator {
    fn generate<'a>(&'a self, _request: &'a GenerateRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(async { Err(LlmError::NotConfigured) })
    }
}

/// Extract a JSON object from a model reply (handles markdown code fences)
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }

    if let Some(start) = text.find("```json") {
        let start = start + "```json".len();
        if let Some(end) = text[start..].find("```") {
            return Some(text[start..start + end].trim());
        }
    }

    if let Some(start) = text.find("```") {
        let start = start + 3;
        let content_start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[content_start..].find("```") {
            let block = text[content_start..content_start + end].trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_json() {
        let input = r#"  {"workout": {}}  "#;
        assert_eq!(extract_json(input), Some(r#"{"workout": {}}"#));
    }

    #[test]
    fn extracts_fenced_json() {
        let input = "Here you go:\n```json\n{\"workout\": 1}\n```\nEnjoy!";
        assert_eq!(extract_json(input), Some("{\"workout\": 1}"));
    }

    #[test]
    fn extracts_embedded_object() {
        let input = r#"The plan is {"timing": 2} as shown."#;
        assert_eq!(extract_json(input), Some(r#"{"timing": 2}"#));
    }

    #[test]
    fn plain_workout_text_has_no_json() {
        assert_eq!(extract_json("20-Minute AMRAP\n10 Burpees\n15 Air Squats"), None);
    }

    #[test]
    fn builds_deployment_url() {
        let generator = AzureOpenAiGenerator::new(LlmSettings {
            endpoint: "https://wod.openai.azure.com".to_string(),
            api_key: "key".to_string(),
            model: "o4-mini".to_string(),
            max_tokens: 1200,
        });
        assert_eq!(
            generator.completions_url(),
            "https://wod.openai.azure.com/openai/deployments/o4-mini/chat/completions?api-version=2024-08-01-preview"
        );
    }

    #[tokio::test]
    async fn unconfigured_generator_always_fails() {
        let request = GenerateRequest::default();
        assert_eq!(
            UnconfiguredGenerator.generate(&request).await,
            Err(LlmError::NotConfigured)
        );
    }
}
