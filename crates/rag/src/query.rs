//! Query understanding: turning a raw query into something comparable
//! against the document store.
//!
//! Three interchangeable strategies exist; a deployment commits to
//! one, matching how its store was indexed. The AI-expanded strategy
//! absorbs every expansion failure locally and falls back to plain
//! tokenization — an expansion problem must never surface to the
//! caller.

use crate::embeddings::EmbeddingProvider;
use crate::types::QueryRepresentation;
use sattva_core::AppResult;
use sattva_llm::{LlmClient, LlmRequest};
use std::collections::HashSet;
use std::sync::Arc;

/// Tokenize text into lowercase keywords.
///
/// Splits on non-alphanumeric boundaries, drops tokens of length <= 2,
/// and deduplicates while preserving first-seen order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 2)
        .filter(|token| seen.insert(token.to_string()))
        .map(|token| token.to_string())
        .collect()
}

/// Parse a free-form keyword-expansion reply into a token list.
///
/// The model is asked for a comma-separated list, but replies drift:
/// entries are split on commas, periods, and newlines, then each entry
/// is tokenized (multi-word phrases become individual keywords) with
/// the same minimum-length filter as [`tokenize`]. Pure function,
/// testable without a live provider.
pub fn parse_keyword_response(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| matches!(c, ',' | '.' | '\n'))
        .flat_map(|entry| tokenize(entry))
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Prompt template for AI keyword expansion.
fn expansion_prompt(query: &str) -> String {
    format!(
        "You are a search engine optimizer for a wellness knowledge base.\n\
         User Query: \"{}\"\n\
         Task: Output exactly 5 key English words or simple phrases that represent \
         the core intent of this query. \
         Include synonyms (e.g. if 'pain', add 'relief', 'hurt').\n\
         Output format: comma-separated list ONLY. No explanations.",
        query
    )
}

/// Active query-understanding strategy.
pub enum QueryStrategy {
    /// Offline tokenization; deterministic and free
    Lexical,

    /// LLM keyword expansion with mandatory lexical fallback
    Expanded {
        client: Arc<dyn LlmClient>,
        model: String,
    },

    /// Dense vector via the same embedding function used at ingestion
    Embedded { provider: Arc<dyn EmbeddingProvider> },
}

impl QueryStrategy {
    /// Derive the query representation for one request.
    ///
    /// Only the embedded strategy can fail (a remote embedding backend
    /// is a hard dependency); the other two always produce keywords.
    pub async fn represent(&self, query: &str) -> AppResult<QueryRepresentation> {
        match self {
            Self::Lexical => Ok(QueryRepresentation::Keywords(tokenize(query))),

            Self::Expanded { client, model } => {
                Ok(QueryRepresentation::Keywords(
                    expand_keywords(client.as_ref(), model, query).await,
                ))
            }

            Self::Embedded { provider } => {
                let vector = provider.embed(query).await?;
                Ok(QueryRepresentation::Vector(vector))
            }
        }
    }

    /// Strategy name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Expanded { .. } => "expanded",
            Self::Embedded { .. } => "embedded",
        }
    }
}

/// Ask the LLM to expand the query; fall back to tokenization on any
/// failure or unparseable reply.
async fn expand_keywords(client: &dyn LlmClient, model: &str, query: &str) -> Vec<String> {
    let request = LlmRequest::new(model)
        .with_user(expansion_prompt(query))
        .with_temperature(0.0);

    match client.complete(&request).await {
        Ok(response) => {
            let keywords = parse_keyword_response(&response.content);
            if keywords.is_empty() {
                tracing::warn!("Keyword expansion reply was unparseable, using raw query");
                tokenize(query)
            } else {
                tracing::debug!("Expanded query into keywords: {:?}", keywords);
                keywords
            }
        }
        Err(e) => {
            tracing::warn!("Keyword expansion failed ({}), using raw query", e);
            tokenize(query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sattva_core::AppError;
    use sattva_llm::LlmResponse;

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("How does breathing help stress?");
        assert_eq!(tokens, vec!["how", "does", "breathing", "help", "stress"]);
    }

    #[test]
    fn test_tokenize_drops_short_and_dedupes() {
        let tokens = tokenize("to be or not to be, yoga is yoga");
        assert_eq!(tokens, vec!["not", "yoga"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_parse_keyword_response_commas() {
        let keywords = parse_keyword_response("stress, relaxation, breathing, calm, anxiety");
        assert_eq!(
            keywords,
            vec!["stress", "relaxation", "breathing", "calm", "anxiety"]
        );
    }

    #[test]
    fn test_parse_keyword_response_mixed_delimiters() {
        let keywords = parse_keyword_response("Stress relief.\nbreathing, CALM");
        assert_eq!(keywords, vec!["stress", "relief", "breathing", "calm"]);
    }

    #[test]
    fn test_parse_keyword_response_unparseable() {
        assert!(parse_keyword_response("").is_empty());
        assert!(parse_keyword_response(", . \n ab, x").is_empty());
    }

    /// Stub expansion backend.
    struct StubLlm {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubLlm {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            match self.reply {
                Ok(text) => Ok(LlmResponse {
                    content: text.to_string(),
                    model: request.model.clone(),
                }),
                Err(msg) => Err(AppError::Provider(msg.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_expanded_strategy_uses_llm_keywords() {
        let strategy = QueryStrategy::Expanded {
            client: Arc::new(StubLlm {
                reply: Ok("sleep, rest, insomnia, relaxation, evening"),
            }),
            model: "test-model".to_string(),
        };

        match strategy.represent("poses before bed").await.unwrap() {
            QueryRepresentation::Keywords(keywords) => {
                assert_eq!(
                    keywords,
                    vec!["sleep", "rest", "insomnia", "relaxation", "evening"]
                );
            }
            QueryRepresentation::Vector(_) => panic!("expected keywords"),
        }
    }

    #[tokio::test]
    async fn test_expanded_strategy_falls_back_on_provider_failure() {
        let strategy = QueryStrategy::Expanded {
            client: Arc::new(StubLlm {
                reply: Err("rate limited"),
            }),
            model: "test-model".to_string(),
        };

        match strategy.represent("poses before bed").await.unwrap() {
            QueryRepresentation::Keywords(keywords) => {
                // The raw query is tokenized instead
                assert_eq!(keywords, vec!["poses", "before", "bed"]);
            }
            QueryRepresentation::Vector(_) => panic!("expected keywords"),
        }
    }

    #[tokio::test]
    async fn test_expanded_strategy_falls_back_on_empty_reply() {
        let strategy = QueryStrategy::Expanded {
            client: Arc::new(StubLlm { reply: Ok("  ") }),
            model: "test-model".to_string(),
        };

        match strategy.represent("morning energy flow").await.unwrap() {
            QueryRepresentation::Keywords(keywords) => {
                assert_eq!(keywords, vec!["morning", "energy", "flow"]);
            }
            QueryRepresentation::Vector(_) => panic!("expected keywords"),
        }
    }

    #[tokio::test]
    async fn test_embedded_strategy() {
        let strategy = QueryStrategy::Embedded {
            provider: Arc::new(crate::embeddings::providers::TrigramProvider::new(64)),
        };

        match strategy.represent("breathing exercises").await.unwrap() {
            QueryRepresentation::Vector(vector) => assert_eq!(vector.len(), 64),
            QueryRepresentation::Keywords(_) => panic!("expected vector"),
        }
    }
}
