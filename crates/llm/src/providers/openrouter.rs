//! OpenRouter LLM provider implementation.
//!
//! OpenRouter exposes an OpenAI-compatible chat-completions API and
//! routes to many upstream models, including free-tier ones. Free
//! tiers are individually flaky (rate limits, transient 4xx/5xx), so
//! this client reports every failure as `AppError::Provider` and lets
//! the fallback chain decide what to do next.

use crate::client::{ChatMessage, LlmClient, LlmRequest, LlmResponse};
use sattva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat-completions request format.
#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// OpenRouter chat-completions response format.
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    #[serde(default)]
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter LLM client.
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client with a bounded per-call timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Create a new OpenRouter client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    fn provider_name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending completion request to OpenRouter: {}", request.model);

        let body = OpenRouterRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("OpenRouter request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "OpenRouter API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: OpenRouterResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse OpenRouter response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::Provider(format!(
                "OpenRouter returned an empty completion for {}",
                request.model
            )));
        }

        Ok(LlmResponse {
            content,
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new("key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "openrouter");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "model": "google/gemini-2.0-flash-exp:free",
            "choices": [{"message": {"role": "assistant", "content": "Namaste."}}]
        }"#;

        let parsed: OpenRouterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Namaste.")
        );
    }

    #[test]
    fn test_response_parsing_missing_choices() {
        // Rate-limited responses sometimes carry no choices at all
        let parsed: OpenRouterResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }
}
