//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and
//! secret injection.

use crate::client::LlmClient;
use crate::providers::{HuggingFaceClient, OllamaClient, OpenRouterClient};
use sattva_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openrouter", "huggingface", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by hosted providers)
/// * `timeout` - Bounded timeout applied to each outbound call
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openrouter" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenRouter provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => OpenRouterClient::with_base_url(url, api_key, timeout)?,
                None => OpenRouterClient::new(api_key, timeout)?,
            };
            Ok(Arc::new(client))
        }
        "huggingface" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Hugging Face provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => HuggingFaceClient::with_base_url(url, api_key, timeout)?,
                None => HuggingFaceClient::new(api_key, timeout)?,
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url, timeout)?,
                None => OllamaClient::new(timeout)?,
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_create_openrouter_client() {
        let client = create_client("openrouter", None, Some("key"), TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "openrouter");
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, TIMEOUT);
        assert!(client.is_ok());
    }

    #[test]
    fn test_openrouter_requires_api_key() {
        match create_client("openrouter", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires an API key")),
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_huggingface_requires_api_key() {
        match create_client("huggingface", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires an API key")),
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("watsonx", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown provider")),
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }
}
