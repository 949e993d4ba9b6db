//! Sattva RAG Library
//!
//! The retrieval-augmented answering core:
//! - **safety** — substring gate intercepting risky queries before any
//!   AI call
//! - **store** — fixed, pre-indexed corpus of wellness articles
//! - **query** — query understanding (lexical, AI-expanded, embedded)
//! - **retriever** — scoring and stable top-k ranking
//! - **embeddings** — embedding provider trait and implementations
//! - **pipeline** — the orchestrator and sole error boundary

pub mod embeddings;
pub mod pipeline;
pub mod query;
pub mod retriever;
pub mod safety;
pub mod store;
pub mod types;

pub use pipeline::RagPipeline;
pub use safety::{check_safety, SafetyVerdict};
pub use store::DocumentStore;
pub use types::{AnswerResult, Article, IndexedDocument, SourceRef};
