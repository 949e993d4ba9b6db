//! Error types for the Sattva assistant.
//!
//! This module defines a unified error enum covering every error
//! category in the answering pipeline: configuration, I/O, provider
//! calls, corpus ingestion, and readiness.

use thiserror::Error;

/// Unified error type for the Sattva assistant.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// The pipeline-facing variants follow a strict escalation policy:
/// a single `Provider` failure is recovered by advancing the fallback
/// chain and only becomes `AllProvidersExhausted` when every backend
/// has been tried. `Ingestion` is fatal to startup. A store that is
/// not ready yet is not an error at all: retrieval returns an empty
/// result and the pipeline answers with an initializing message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single model backend call failed (timeout, rate limit,
    /// malformed or empty response)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Every backend in the generation fallback chain failed
    #[error("All generation providers exhausted")]
    AllProvidersExhausted,

    /// A document failed to index during corpus load
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
