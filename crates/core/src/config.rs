//! Configuration management for the Sattva assistant.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Built-in defaults (the free-tier model ladder)
//! - Config file (sattva.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Precedence is defaults < file < environment < CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Retrieval strategy for query understanding.
///
/// Exactly one strategy is active per deployment; the document store
/// is indexed to match it and the two feature kinds are never mixed
/// against the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// Offline tokenization of the raw query
    Lexical,
    /// LLM-assisted keyword expansion, falling back to lexical
    Expanded,
    /// Dense vector similarity via an embedding provider
    Embedded,
}

impl RetrievalStrategy {
    /// Parse a strategy name from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lexical" => Some(Self::Lexical),
            "expanded" | "ai-expanded" => Some(Self::Expanded),
            "embedded" | "embedding" | "vector" => Some(Self::Embedded),
            _ => None,
        }
    }

    /// Get the canonical strategy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Expanded => "expanded",
            Self::Embedded => "embedded",
        }
    }
}

/// One generation backend in the fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider identifier ("openrouter", "huggingface", "ollama")
    pub provider: String,

    /// Model identifier understood by the provider
    pub model: String,

    /// Optional custom endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the provider API key
    #[serde(rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl BackendConfig {
    /// Resolve the API key for this backend from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Active query-understanding strategy
    pub strategy: RetrievalStrategy,

    /// Number of documents to retrieve per query
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RetrievalStrategy::Expanded,
            top_k: default_top_k(),
        }
    }
}

/// Embedding provider settings (used by the `embedded` strategy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider identifier ("trigram", "ollama")
    pub provider: String,

    /// Model identifier for remote providers
    #[serde(default)]
    pub model: Option<String>,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Optional custom endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: None,
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the corpus file (JSON array of articles)
    pub corpus: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Retrieval settings
    pub retrieval: RetrievalConfig,

    /// Ordered generation fallback chain (tried first to last)
    pub backends: Vec<BackendConfig>,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Timeout in seconds for each outbound provider call
    pub timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure (sattva.yaml).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    corpus: Option<PathBuf>,
    retrieval: Option<RetrievalConfig>,
    backends: Option<Vec<BackendConfig>>,
    embedding: Option<EmbeddingConfig>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("data/articles.json"),
            config_file: None,
            retrieval: RetrievalConfig::default(),
            backends: default_backends(),
            embedding: EmbeddingConfig::default(),
            timeout_secs: 30,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// The default generation ladder: free-tier OpenRouter models in
/// decreasing capability order, then Hugging Face as a distinct-provider
/// safety net. Individually unreliable, collectively available.
fn default_backends() -> Vec<BackendConfig> {
    let openrouter = |model: &str| BackendConfig {
        provider: "openrouter".to_string(),
        model: model.to_string(),
        endpoint: None,
        api_key_env: Some("OPENROUTER_API_KEY".to_string()),
    };

    vec![
        openrouter("google/gemini-2.0-flash-exp:free"),
        openrouter("deepseek/deepseek-r1-distill-llama-70b:free"),
        openrouter("microsoft/phi-3-mini-128k-instruct:free"),
        openrouter("meta-llama/llama-3.1-8b-instruct:free"),
        BackendConfig {
            provider: "huggingface".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.3".to_string(),
            endpoint: None,
            api_key_env: Some("HF_API_KEY".to_string()),
        },
    ]
}

impl AppConfig {
    /// Load configuration from defaults, config file, and environment.
    ///
    /// Environment variables:
    /// - `SATTVA_CONFIG`: Path to config file (default: sattva.yaml)
    /// - `SATTVA_CORPUS`: Override corpus path
    /// - `SATTVA_STRATEGY`: Retrieval strategy
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("SATTVA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("sattva.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the file
        if let Ok(corpus) = std::env::var("SATTVA_CORPUS") {
            config.corpus = PathBuf::from(corpus);
        }

        if let Ok(strategy) = std::env::var("SATTVA_STRATEGY") {
            config.retrieval.strategy = RetrievalStrategy::parse(&strategy)
                .ok_or_else(|| AppError::Config(format!("Unknown strategy: {}", strategy)))?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(corpus) = config_file.corpus {
            result.corpus = corpus;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(backends) = config_file.backends {
            result.backends = backends;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(timeout) = config_file.timeout_secs {
            result.timeout_secs = timeout;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        corpus: Option<PathBuf>,
        config_file: Option<PathBuf>,
        strategy: Option<RetrievalStrategy>,
        top_k: Option<usize>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(corpus) = corpus {
            self.corpus = corpus;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(strategy) = strategy {
            self.retrieval.strategy = strategy;
        }

        if let Some(top_k) = top_k {
            self.retrieval.top_k = top_k;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.backends.is_empty() {
            return Err(AppError::Config(
                "At least one generation backend is required".to_string(),
            ));
        }

        let known_providers = ["openrouter", "huggingface", "ollama"];
        for backend in &self.backends {
            if !known_providers.contains(&backend.provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown provider: {}. Supported: {}",
                    backend.provider,
                    known_providers.join(", ")
                )));
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if self.retrieval.strategy == RetrievalStrategy::Embedded
            && self.embedding.dimensions == 0
        {
            return Err(AppError::Config(
                "Embedding dimensions must be non-zero for the embedded strategy".to_string(),
            ));
        }

        Ok(())
    }
}
