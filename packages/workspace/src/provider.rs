//! OpenAI-compatible chat completions provider

use crate::config::GenerationConfig;
use crate::generator::{GenerationError, GenerationRequest, GenerationService};
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use blockpatch_normalizer::extract_json;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    /// Missing keys surface per request as invalid credentials
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &GenerationConfig, api_key: Option<String>) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout() + Duration::from_secs(1))
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Read the API key from the environment variable named in config
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::info!(
                env = %config.api_key_env,
                "no API key in environment; instructions will fail until it is set"
            );
        }
        Self::new(config, api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &GenerationRequest) -> Result<ChatRequest, GenerationError> {
        let prompt = user_prompt(request).map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        })
    }
}

#[async_trait]
impl GenerationService for ChatCompletionsProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::InvalidCredentials(format!(
                "API key not found in environment variable '{}'",
                self.api_key_env
            ))
        })?;

        let body = self.request_body(request)?;

        debug!(
            provider = "chat_completions",
            model = %self.model,
            document_id = %request.document.id,
            selected = request.selected_ids.len(),
            "Invoking generation service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GenerationError::InvalidCredentials(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Network(format!(
                "HTTP {}: {}",
                status,
                truncate(&detail, 200)
            )));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedOutput(format!("Failed to parse response: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedOutput("response missing choices[0].message.content".to_string()))?;

        debug!(provider = "chat_completions", chars = content.len(), "Received generation output");

        extract_json(&content).map_err(|e| GenerationError::MalformedOutput(e.to_string()))
    }
}

fn transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Network(format!("request timed out: {}", error))
    } else if error.is_builder() {
        GenerationError::Request(error.to_string())
    } else {
        GenerationError::Network(error.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpatch_model::seed_document;

    fn request() -> GenerationRequest {
        GenerationRequest::new(seed_document("report"), vec!["intro".to_string()], "shorter")
    }

    #[test]
    fn test_request_body_uses_config() {
        let config = GenerationConfig {
            model: "test-model".to_string(),
            max_tokens: 512,
            ..GenerationConfig::default()
        };
        let provider = ChatCompletionsProvider::new(&config, Some("key".to_string())).unwrap();
        let body = provider.request_body(&request()).unwrap();

        assert_eq!(body.model, "test-model");
        assert_eq!(body.max_tokens, 512);
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert!(body.messages[1].content.contains("Instruction: shorter"));
    }

    #[tokio::test]
    async fn test_missing_key_is_invalid_credentials() {
        let provider = ChatCompletionsProvider::new(&GenerationConfig::default(), Some("  ".to_string())).unwrap();
        let err = provider.generate(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_credentials");
    }

    #[test]
    fn test_response_shape() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"```json\n{\"ops\":[]}\n```"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = response.choices[0].message.content.as_deref().unwrap();
        assert_eq!(extract_json(content).unwrap(), serde_json::json!({"ops": []}));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
