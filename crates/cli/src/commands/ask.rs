//! Ask command handler.
//!
//! The process composition root: loads the corpus, indexes the
//! document store, assembles the query strategy and the generation
//! fallback chain from configuration, and runs one query through the
//! pipeline. The pipeline object is constructed explicitly here — no
//! global singletons, no module-load side effects.

use clap::Args;
use sattva_core::{config::AppConfig, config::RetrievalStrategy, AppError, AppResult};
use sattva_llm::{create_client, FallbackChain};
use sattva_rag::embeddings;
use sattva_rag::query::QueryStrategy;
use sattva_rag::{Article, DocumentStore, RagPipeline};
use std::path::Path;
use std::time::Duration;

/// Ask a question against the corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        if self.query.trim().is_empty() {
            return Err(AppError::Config("Query must not be empty".to_string()));
        }

        let pipeline = build_pipeline(config).await?;
        let result = pipeline.ask(&self.query).await;

        if self.json {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", result.answer);

            if !result.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &result.sources {
                    println!("  [{}] {}", source.id, source.title);
                }
            }
        }

        Ok(())
    }
}

/// Load the corpus from a JSON file: an ordered array of articles.
pub(crate) fn load_corpus(path: &Path) -> AppResult<Vec<Article>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read corpus {:?}: {}", path, e)))?;

    let articles: Vec<Article> = serde_json::from_str(&contents)
        .map_err(|e| AppError::Ingestion(format!("Failed to parse corpus {:?}: {}", path, e)))?;

    tracing::info!("Loaded {} articles from {:?}", articles.len(), path);

    Ok(articles)
}

/// Assemble the full pipeline from configuration.
async fn build_pipeline(config: &AppConfig) -> AppResult<RagPipeline> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let articles = load_corpus(&config.corpus)?;

    // Generation chain: backends that cannot be constructed (usually a
    // missing API key) are skipped with a warning instead of aborting,
    // so a partially configured deployment still answers via the
    // remaining backends or the emergency fallback.
    let mut chain = FallbackChain::new();
    for backend in &config.backends {
        let api_key = backend.resolve_api_key();
        match create_client(
            &backend.provider,
            backend.endpoint.as_deref(),
            api_key.as_deref(),
            timeout,
        ) {
            Ok(client) => chain.push(client, &backend.model),
            Err(e) => {
                tracing::warn!(
                    "Skipping backend '{}' (model: {}): {}",
                    backend.provider,
                    backend.model,
                    e
                );
            }
        }
    }

    if chain.is_empty() {
        tracing::warn!(
            "No generation backend is usable; answers will fall back to direct quotes"
        );
    }

    let (store, strategy) = match config.retrieval.strategy {
        RetrievalStrategy::Lexical => {
            (DocumentStore::load_lexical(articles), QueryStrategy::Lexical)
        }

        RetrievalStrategy::Expanded => {
            let store = DocumentStore::load_lexical(articles);

            // Expansion reuses the head of the generation chain; with
            // no usable backend the strategy degrades to plain lexical.
            let strategy = match config.backends.first() {
                Some(head) if !chain.is_empty() => {
                    let api_key = head.resolve_api_key();
                    match create_client(
                        &head.provider,
                        head.endpoint.as_deref(),
                        api_key.as_deref(),
                        timeout,
                    ) {
                        Ok(client) => QueryStrategy::Expanded {
                            client,
                            model: head.model.clone(),
                        },
                        Err(_) => QueryStrategy::Lexical,
                    }
                }
                _ => {
                    tracing::warn!("No expansion backend available, using lexical strategy");
                    QueryStrategy::Lexical
                }
            };

            (store, strategy)
        }

        RetrievalStrategy::Embedded => {
            let provider = embeddings::create_provider(
                &config.embedding.provider,
                config.embedding.dimensions,
                config.embedding.model.as_deref(),
                config.embedding.endpoint.as_deref(),
                timeout,
            )?;

            let store = DocumentStore::load_embedded(articles, provider.clone()).await?;
            (store, QueryStrategy::Embedded { provider })
        }
    };

    Ok(RagPipeline::new(
        store,
        strategy,
        chain,
        config.retrieval.top_k,
    ))
}
