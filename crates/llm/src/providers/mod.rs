//! Concrete LLM provider implementations.

pub mod huggingface;
pub mod ollama;
pub mod openrouter;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;
