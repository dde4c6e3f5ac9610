//! OpenAI-compatible chat-completions provider
//!
//! Works against any gateway exposing `POST {base_url}/chat/completions`
//! with bearer authentication.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LLMProviderConfig;
use crate::error::{DialcheckError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo};

/// Chat-completions provider (OpenAI, or a compatible AI gateway).
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new provider against a given endpoint.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token for the endpoint
    /// * `model` - Model name (e.g., "google/gemini-2.5-flash", "gpt-4o")
    /// * `base_url` - API base URL, without the `/chat/completions` suffix
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from configuration, resolving the credential.
    ///
    /// # Errors
    ///
    /// Returns `DialcheckError::Configuration` if no API key is available.
    pub fn from_config(config: &LLMProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(api_key, config.model.clone(), config.base_url.clone()))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Only the reply text is read; other fields (`usage`, `id`, ...) are ignored.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatError {
    error: ChatErrorDetail,
}

#[derive(Deserialize)]
struct ChatErrorDetail {
    message: String,
}

fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| ChatMessage {
            role: match m.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: m.content.clone(),
        })
        .collect()
}

/// First choice's content; a missing choice, message, or content is an empty reply.
fn into_response(body: ChatResponse) -> LLMResponse {
    let content = body
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    LLMResponse { content }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: convert_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, messages = chat_request.messages.len(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| DialcheckError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ChatError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);

            return Err(DialcheckError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| DialcheckError::Transport(format!("Failed to parse response: {}", e)))?;

        Ok(into_response(body))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai-compatible".to_string(),
            model_name: self.model.clone(),
        }
    }
}
