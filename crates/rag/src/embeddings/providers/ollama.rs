//! Ollama embedding provider.
//!
//! Remote embedding backend for deployments with an Ollama instance.
//! Unlike the generation fallback chain, a failure here propagates:
//! there is no meaningful degraded embedding, so the orchestrator
//! converts the error at its boundary instead.

use crate::embeddings::provider::EmbeddingProvider;
use sattva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embeddings API client.
#[derive(Debug)]
pub struct OllamaEmbeddingProvider {
    base_url: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl OllamaEmbeddingProvider {
    /// Create a new Ollama embedding provider.
    pub fn new(
        model: impl Into<String>,
        dimensions: usize,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: endpoint.unwrap_or(DEFAULT_BASE_URL).to_string(),
            model: model.into(),
            dimensions,
            client,
        })
    }

    /// Normalize a vector to unit length in place.
    fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let body = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Ollama embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Ollama embeddings API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse Ollama embedding response: {}", e))
        })?;

        if parsed.embedding.len() != self.dimensions {
            return Err(AppError::Provider(format!(
                "Ollama returned a {}-dimension embedding, expected {}",
                parsed.embedding.len(),
                self.dimensions
            )));
        }

        Ok(Self::normalize(parsed.embedding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider =
            OllamaEmbeddingProvider::new("nomic-embed-text", 768, None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.dimensions(), 768);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_normalize() {
        let normalized = OllamaEmbeddingProvider::normalize(vec![3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let normalized = OllamaEmbeddingProvider::normalize(vec![0.0, 0.0]);
        assert_eq!(normalized, vec![0.0, 0.0]);
    }
}
