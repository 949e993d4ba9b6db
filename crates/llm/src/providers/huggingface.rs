//! Hugging Face Inference API provider implementation.
//!
//! Serves as the distinct-provider safety net at the tail of the
//! fallback chain: when every OpenRouter model is rate limited, a
//! separate vendor with separate quotas still has a chance to answer.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use sattva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

const DEFAULT_MAX_NEW_TOKENS: u32 = 500;

/// Hugging Face text-generation request format.
#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

/// Hugging Face text-generation response entry.
#[derive(Debug, Deserialize)]
struct HfGeneration {
    #[serde(default)]
    generated_text: Option<String>,
}

/// Hugging Face Inference API client.
pub struct HuggingFaceClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a new Hugging Face client with a bounded per-call timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Create a new Hugging Face client with a custom base URL.
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

    /// Wrap a flat prompt in the Mistral instruction format.
    fn wrap_instruction(prompt: &str) -> String {
        format!("<s>[INST] {} [/INST]", prompt)
    }
}

#[async_trait::async_trait]
impl LlmClient for HuggingFaceClient {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            "Sending text-generation request to Hugging Face: {}",
            request.model
        );

        // HF text-generation takes a flat prompt, so the message list
        // is rendered down (system text first, then user text).
        let mut prompt = request.prompt_text();
        if let Some(system) = request.system_text() {
            prompt = format!("{}\n\n{}", system, prompt);
        }

        let body = HfRequest {
            inputs: Self::wrap_instruction(&prompt),
            parameters: HfParameters {
                max_new_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS),
                return_full_text: false,
            },
        };

        let url = format!("{}/{}", self.base_url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Hugging Face request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Hugging Face API error ({}): {}",
                status, error_text
            )));
        }

        let generations: Vec<HfGeneration> = response.json().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse Hugging Face response: {}", e))
        })?;

        let content = generations
            .into_iter()
            .next()
            .and_then(|g| g.generated_text)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::Provider(format!(
                "Hugging Face returned an empty generation for {}",
                request.model
            )));
        }

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HuggingFaceClient::new("key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "huggingface");
    }

    #[test]
    fn test_instruction_wrapping() {
        let wrapped = HuggingFaceClient::wrap_instruction("What is pranayama?");
        assert_eq!(wrapped, "<s>[INST] What is pranayama? [/INST]");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"[{"generated_text": "Pranayama is breath regulation."}]"#;
        let generations: Vec<HfGeneration> = serde_json::from_str(json).unwrap();
        assert_eq!(
            generations[0].generated_text.as_deref(),
            Some("Pranayama is breath regulation.")
        );
    }
}
