//! Sattva LLM Library
//!
//! Chat-completion provider abstraction for the answer generator:
//! - `LlmClient` capability trait and request/response types
//! - Concrete providers (OpenRouter, Hugging Face Inference, Ollama)
//! - `FallbackChain`: ordered multi-backend generation with
//!   first-success-wins semantics

pub mod client;
pub mod factory;
pub mod fallback;
pub mod providers;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse};
pub use factory::create_client;
pub use fallback::FallbackChain;
