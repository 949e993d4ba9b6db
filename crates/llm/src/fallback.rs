//! Ordered multi-backend generation with first-success-wins semantics.
//!
//! Provider free tiers are individually unreliable: rate limits and
//! transient 4xx/5xx errors are routine. Trying several inexpensive
//! backends sequentially trades latency for availability, and
//! returning at the first success bounds worst-case latency by the
//! number of failed attempts only.

use crate::client::{LlmClient, LlmRequest};
use sattva_core::{AppError, AppResult};
use std::sync::Arc;

/// One backend in the chain: a client plus the model it should run.
#[derive(Clone)]
pub struct Backend {
    /// Provider client
    pub client: Arc<dyn LlmClient>,

    /// Model identifier passed to the provider
    pub model: String,
}

/// Ordered generation fallback chain.
///
/// Backends are tried strictly in order, one attempt each, never in
/// parallel: attempting providers concurrently would waste quota on
/// backends that may not be needed and breaks first-success-wins
/// semantics.
#[derive(Clone, Default)]
pub struct FallbackChain {
    backends: Vec<Backend>,
}

impl FallbackChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend to the end of the chain.
    pub fn push(&mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) {
        self.backends.push(Backend {
            client,
            model: model.into(),
        });
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with_backend(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.push(client, model);
        self
    }

    /// Number of backends in the chain.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Generate text for a prompt, trying each backend in order.
    ///
    /// The first non-empty completion is returned immediately and no
    /// further backends are attempted. A failure (network error, rate
    /// limit, timeout, empty response) is logged and the next backend
    /// is tried. If every backend fails, `AllProvidersExhausted` is
    /// raised for the orchestrator to convert into a degraded answer.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        if self.backends.is_empty() {
            return Err(AppError::AllProvidersExhausted);
        }

        for backend in &self.backends {
            tracing::info!(
                "Trying generation backend '{}' (model: {})",
                backend.client.provider_name(),
                backend.model
            );

            let request = LlmRequest::new(&backend.model).with_user(prompt);

            match backend.client.complete(&request).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    tracing::info!(
                        "Generation succeeded on '{}' (model: {})",
                        backend.client.provider_name(),
                        backend.model
                    );
                    return Ok(response.content);
                }
                Ok(_) => {
                    tracing::warn!(
                        "Backend '{}' returned empty text, advancing",
                        backend.client.provider_name()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Backend '{}' (model: {}) failed: {}, advancing",
                        backend.client.provider_name(),
                        backend.model,
                        e
                    );
                }
            }
        }

        tracing::error!("All {} generation backends exhausted", self.backends.len());
        Err(AppError::AllProvidersExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LlmResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that returns a scripted result and counts calls.
    struct ScriptedClient {
        name: &'static str,
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn succeeding(reply: &str) -> Self {
            Self {
                name: "scripted",
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                name: "scripted",
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(LlmResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                }),
                None => Err(AppError::Provider("scripted failure".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = Arc::new(ScriptedClient::succeeding("answer one"));
        let second = Arc::new(ScriptedClient::succeeding("answer two"));

        let chain = FallbackChain::new()
            .with_backend(first.clone(), "model-a")
            .with_backend(second.clone(), "model-b");

        let result = chain.generate("prompt").await.unwrap();
        assert_eq!(result, "answer one");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_advances_past_failures() {
        let first = Arc::new(ScriptedClient::failing());
        let second = Arc::new(ScriptedClient::failing());
        let third = Arc::new(ScriptedClient::succeeding("third time lucky"));
        let fourth = Arc::new(ScriptedClient::succeeding("never reached"));

        let chain = FallbackChain::new()
            .with_backend(first.clone(), "a")
            .with_backend(second.clone(), "b")
            .with_backend(third.clone(), "c")
            .with_backend(fourth.clone(), "d");

        let result = chain.generate("prompt").await.unwrap();
        assert_eq!(result, "third time lucky");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 1);
        // Backends past the first success are never invoked
        assert_eq!(fourth.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_reply_treated_as_failure() {
        let empty = Arc::new(ScriptedClient::succeeding("   "));
        let solid = Arc::new(ScriptedClient::succeeding("real answer"));

        let chain = FallbackChain::new()
            .with_backend(empty.clone(), "a")
            .with_backend(solid.clone(), "b");

        let result = chain.generate("prompt").await.unwrap();
        assert_eq!(result, "real answer");
        assert_eq!(empty.calls(), 1);
        assert_eq!(solid.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let first = Arc::new(ScriptedClient::failing());
        let second = Arc::new(ScriptedClient::failing());

        let chain = FallbackChain::new()
            .with_backend(first.clone(), "a")
            .with_backend(second.clone(), "b");

        let result = chain.generate("prompt").await;
        assert!(matches!(result, Err(AppError::AllProvidersExhausted)));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_exhausts_immediately() {
        let chain = FallbackChain::new();
        let result = chain.generate("prompt").await;
        assert!(matches!(result, Err(AppError::AllProvidersExhausted)));
    }
}
