//! Ollama LLM provider implementation.
//!
//! Ollama is a local LLM runtime and the offline option in the
//! fallback chain. Its generate endpoint streams newline-delimited
//! JSON fragments; this client accumulates the whole stream into a
//! single string before returning, so partial output never leaves the
//! provider.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use futures::StreamExt;
use sattva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    stream: bool,
}

/// One fragment of Ollama's newline-delimited JSON stream.
#[derive(Debug, Deserialize)]
struct OllamaFragment {
    model: String,
    response: String,
    done: bool,
}

/// Accumulates raw stream chunks and yields fragments as complete
/// lines become available.
///
/// A chunk may carry several fragments, a partial line, or both; only
/// complete lines are parsed, the remainder waits for the next chunk.
struct FragmentBuffer {
    pending: String,
}

impl FragmentBuffer {
    fn new() -> Self {
        Self {
            pending: String::new(),
        }
    }

    /// Feed one chunk of bytes; returns the fragments it completed.
    fn push(&mut self, bytes: &[u8]) -> AppResult<Vec<OllamaFragment>> {
        self.pending.push_str(&String::from_utf8_lossy(bytes));

        let mut fragments = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line = self.pending[..newline].trim().to_string();
            self.pending.drain(..=newline);

            if line.is_empty() {
                continue;
            }

            let fragment: OllamaFragment = serde_json::from_str(&line).map_err(|e| {
                AppError::Provider(format!("Failed to parse Ollama fragment: {}", e))
            })?;
            fragments.push(fragment);
        }

        Ok(fragments)
    }
}

/// Ollama LLM client.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with a bounded per-call timeout.
    ///
    /// Default URL: http://localhost:11434
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt_text(),
            system: request.system_text(),
            temperature: request.temperature,
            num_predict: request.max_tokens,
            stream: true,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending generate request to Ollama: {}", request.model);

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        // Accumulate the newline-delimited JSON stream into one string.
        // The loop is bounded by stream completion (`done: true` or EOF).
        let mut byte_stream = response.bytes_stream();
        let mut buffer = FragmentBuffer::new();
        let mut content = String::new();
        let mut model = request.model.clone();
        let mut done = false;

        while let Some(chunk) = byte_stream.next().await {
            let bytes =
                chunk.map_err(|e| AppError::Provider(format!("Ollama stream error: {}", e)))?;

            for fragment in buffer.push(&bytes)? {
                content.push_str(&fragment.response);
                model = fragment.model;

                if fragment.done {
                    done = true;
                }
            }

            if done {
                break;
            }
        }

        if content.trim().is_empty() {
            return Err(AppError::Provider(format!(
                "Ollama returned an empty generation for {}",
                request.model
            )));
        }

        Ok(LlmResponse { content, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_request_conversion() {
        let client = OllamaClient::new(Duration::from_secs(5)).unwrap();
        let request = LlmRequest::new("llama3.2")
            .with_user("Hello")
            .with_system("Be brief")
            .with_temperature(0.7)
            .with_max_tokens(100);

        let ollama_req = client.to_ollama_request(&request);
        assert_eq!(ollama_req.model, "llama3.2");
        assert_eq!(ollama_req.prompt, "Hello");
        assert_eq!(ollama_req.system, Some("Be brief".to_string()));
        assert_eq!(ollama_req.temperature, Some(0.7));
        assert_eq!(ollama_req.num_predict, Some(100));
        assert!(ollama_req.stream);
    }

    #[test]
    fn test_buffer_concatenates_fragments_split_across_chunks() {
        let mut buffer = FragmentBuffer::new();

        // First chunk ends mid-line: nothing is complete yet
        let fragments = buffer
            .push(br#"{"model":"llama3.2","response":"Bre","done":false}"#)
            .unwrap();
        assert!(fragments.is_empty());

        // Second chunk closes the first line and carries two more
        // whole fragments
        let fragments = buffer
            .push(
                b"\n{\"model\":\"llama3.2\",\"response\":\"athe \",\"done\":false}\n\
                  {\"model\":\"llama3.2\",\"response\":\"slowly.\",\"done\":true}\n",
            )
            .unwrap();
        assert_eq!(fragments.len(), 3);

        let content: String = fragments.iter().map(|f| f.response.as_str()).collect();
        assert_eq!(content, "Breathe slowly.");
        assert!(fragments[2].done);
        assert!(!fragments[0].done);
    }

    #[test]
    fn test_buffer_skips_blank_lines() {
        let mut buffer = FragmentBuffer::new();
        let fragments = buffer
            .push(b"\n\n{\"model\":\"llama3.2\",\"response\":\"ok\",\"done\":true}\n\n")
            .unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].response, "ok");
    }

    #[test]
    fn test_buffer_rejects_malformed_line() {
        let mut buffer = FragmentBuffer::new();
        let result = buffer.push(b"not json at all\n");
        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[test]
    fn test_fragment_parsing() {
        let line = r#"{"model":"llama3.2","response":"Bre","done":false}"#;
        let fragment: OllamaFragment = serde_json::from_str(line).unwrap();
        assert_eq!(fragment.response, "Bre");
        assert!(!fragment.done);

        let line = r#"{"model":"llama3.2","response":"","done":true}"#;
        let fragment: OllamaFragment = serde_json::from_str(line).unwrap();
        assert!(fragment.done);
    }
}
