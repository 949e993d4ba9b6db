//! LLM client abstraction and request/response types.
//!
//! This module defines the core abstractions for interacting with
//! chat-completion providers. Providers are a closed set of variants
//! behind one capability interface so the fallback chain stays
//! backend-agnostic: new backends are added by implementing
//! [`LlmClient`], not by branching on type.

use sattva_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system" or "user")
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// LLM completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier (e.g., "google/gemini-2.0-flash-exp:free")
    pub model: String,

    /// Ordered message list
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Create a new request for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Append a user message.
    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// Prepend a system message.
    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.messages.insert(0, ChatMessage::system(content));
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenated system message text, if any.
    pub fn system_text(&self) -> Option<String> {
        let text: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text.join("\n"))
        }
    }

    /// Concatenated non-system message text.
    ///
    /// Used by providers that take a flat prompt instead of a message
    /// list (Ollama, Hugging Face text-generation).
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// LLM completion response.
///
/// Always a fully buffered string: providers that stream internally
/// must accumulate every fragment before returning. Partial output is
/// never observable outside the answer generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,
}

/// Trait for LLM providers.
///
/// This trait abstracts the underlying chat-completion provider
/// (OpenRouter, Hugging Face, Ollama, ...) behind a unified interface.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "openrouter", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform one completion attempt.
    ///
    /// A failed or empty completion returns `AppError::Provider`; the
    /// caller decides whether to advance to another backend.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("llama3")
            .with_user("Hello")
            .with_system("Be brief")
            .with_temperature(0.3)
            .with_max_tokens(100);

        assert_eq!(request.model, "llama3");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(100));
    }

    #[test]
    fn test_prompt_text_excludes_system() {
        let request = LlmRequest::new("m")
            .with_user("first")
            .with_user("second")
            .with_system("rules");

        assert_eq!(request.prompt_text(), "first\nsecond");
        assert_eq!(request.system_text(), Some("rules".to_string()));
    }

    #[test]
    fn test_system_text_absent() {
        let request = LlmRequest::new("m").with_user("question");
        assert_eq!(request.system_text(), None);
    }
}
