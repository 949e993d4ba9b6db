//! Embedding provider trait and factory.

use sattva_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
///
/// Implementations must return unit-normalized vectors of a fixed
/// dimension, so cosine similarity reduces to a dot product.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider by name.
///
/// # Arguments
/// * `provider` - Provider identifier ("trigram", "ollama")
/// * `dimensions` - Vector dimensionality
/// * `model` - Model identifier for remote providers
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Bounded timeout for remote calls
pub fn create_provider(
    provider: &str,
    dimensions: usize,
    model: Option<&str>,
    endpoint: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be non-zero".to_string(),
        ));
    }

    match provider.to_lowercase().as_str() {
        "trigram" => Ok(Arc::new(super::providers::trigram::TrigramProvider::new(
            dimensions,
        ))),
        "ollama" => {
            let model = model.unwrap_or("nomic-embed-text");
            let client = super::providers::ollama::OllamaEmbeddingProvider::new(
                model, dimensions, endpoint, timeout,
            )?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", 384, None, None, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_provider_rejects_zero_dimensions() {
        let result = create_provider("trigram", 0, None, None, Duration::from_secs(5));
        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("non-zero")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("word2vec", 300, None, None, Duration::from_secs(5));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }
}
