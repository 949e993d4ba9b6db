//! Embedding providers for the embedded retrieval strategy.
//!
//! Documents and queries must pass through the same embedding function
//! so their vectors live in one space of fixed dimensionality.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
