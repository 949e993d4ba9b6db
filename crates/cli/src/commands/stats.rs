//! Stats command handler.
//!
//! Reports corpus and configuration statistics without issuing any
//! provider call.

use clap::Args;
use sattva_core::{config::AppConfig, AppResult};

/// Show corpus and configuration statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let articles = super::ask::load_corpus(&config.corpus)?;

        if self.json {
            let output = serde_json::json!({
                "corpus": config.corpus,
                "articles": articles.len(),
                "strategy": config.retrieval.strategy.as_str(),
                "topK": config.retrieval.top_k,
                "backends": config.backends.iter().map(|b| {
                    serde_json::json!({
                        "provider": b.provider,
                        "model": b.model,
                        "hasApiKey": b.resolve_api_key().is_some(),
                    })
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Corpus:    {:?} ({} articles)", config.corpus, articles.len());
            println!("Strategy:  {}", config.retrieval.strategy.as_str());
            println!("Top-k:     {}", config.retrieval.top_k);
            println!("Backends:");
            for backend in &config.backends {
                let key = if backend.resolve_api_key().is_some() {
                    "key present"
                } else if backend.api_key_env.is_some() {
                    "key missing"
                } else {
                    "no key needed"
                };
                println!("  {} / {} ({})", backend.provider, backend.model, key);
            }
        }

        Ok(())
    }
}
