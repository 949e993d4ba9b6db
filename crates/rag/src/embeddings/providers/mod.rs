//! Concrete embedding provider implementations.

pub mod ollama;
pub mod trigram;

pub use ollama::OllamaEmbeddingProvider;
pub use trigram::TrigramProvider;
