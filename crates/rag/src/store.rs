//! Document store: a fixed, pre-indexed corpus of articles.
//!
//! The corpus is loaded once at process start and read-only afterward,
//! so concurrent requests can retrieve against it without any
//! synchronization. Ingestion is fail-fast: a partially indexed corpus
//! would produce silently incomplete retrieval, so a single failed
//! document aborts the whole load and the store never reports ready.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Article, IndexedDocument, SearchFeature};
use sattva_core::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;

/// Holds the indexed corpus and the readiness flag.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<IndexedDocument>,
    ready: bool,
}

impl DocumentStore {
    /// Create an empty, not-ready store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a corpus with lowercase token-set features.
    ///
    /// Offline and synchronous; cannot fail per-document.
    pub fn load_lexical(articles: Vec<Article>) -> Self {
        let count = articles.len();

        let documents = articles
            .into_iter()
            .map(|article| {
                let tokens = extract_tokens(&article.title, &article.content);
                IndexedDocument {
                    article,
                    feature: SearchFeature::Tokens(tokens),
                }
            })
            .collect();

        tracing::info!("Document store ready ({} articles, lexical index)", count);

        Self {
            documents,
            ready: true,
        }
    }

    /// Index a corpus with embedding-vector features.
    ///
    /// Each article is embedded over `title + content`. Any single
    /// embedding failure aborts the load with `Ingestion`.
    pub async fn load_embedded(
        articles: Vec<Article>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let count = articles.len();
        let mut documents = Vec::with_capacity(count);

        for article in articles {
            let text = format!("{}. {}", article.title, article.content);
            let vector = provider.embed(&text).await.map_err(|e| {
                AppError::Ingestion(format!(
                    "Failed to embed article '{}': {}",
                    article.id, e
                ))
            })?;

            documents.push(IndexedDocument {
                article,
                feature: SearchFeature::Vector(vector),
            });
        }

        tracing::info!(
            "Document store ready ({} articles, {}-dimension vector index)",
            count,
            provider.dimensions()
        );

        Ok(Self {
            documents,
            ready: true,
        })
    }

    /// Whether every document has been indexed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The indexed corpus, in original order.
    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Extract the lowercase token set over `title + content`.
fn extract_tokens(title: &str, content: &str) -> HashSet<String> {
    crate::query::tokenize(&format!("{} {}", title, content))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_articles() -> Vec<Article> {
        vec![
            Article {
                id: "1".to_string(),
                title: "Breathing".to_string(),
                content: "Pranayama calms the nervous system.".to_string(),
            },
            Article {
                id: "2".to_string(),
                title: "Balance".to_string(),
                content: "Tree pose builds steady focus.".to_string(),
            },
        ]
    }

    #[test]
    fn test_new_store_not_ready() {
        let store = DocumentStore::new();
        assert!(!store.is_ready());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_lexical() {
        let store = DocumentStore::load_lexical(sample_articles());

        assert!(store.is_ready());
        assert_eq!(store.len(), 2);
        assert_eq!(store.documents()[0].article.id, "1");

        match &store.documents()[0].feature {
            SearchFeature::Tokens(tokens) => {
                assert!(tokens.contains("breathing"));
                assert!(tokens.contains("pranayama"));
                // Short tokens are dropped
                assert!(!tokens.contains("the"));
            }
            SearchFeature::Vector(_) => panic!("expected token feature"),
        }
    }

    #[tokio::test]
    async fn test_load_embedded() {
        let provider = Arc::new(crate::embeddings::providers::TrigramProvider::new(64));
        let store = DocumentStore::load_embedded(sample_articles(), provider)
            .await
            .unwrap();

        assert!(store.is_ready());
        assert_eq!(store.len(), 2);
        for doc in store.documents() {
            match &doc.feature {
                SearchFeature::Vector(v) => assert_eq!(v.len(), 64),
                SearchFeature::Tokens(_) => panic!("expected vector feature"),
            }
        }
    }

    #[tokio::test]
    async fn test_load_embedded_fail_fast() {
        /// Provider that always fails, simulating a dead remote backend.
        #[derive(Debug)]
        struct BrokenProvider;

        #[async_trait::async_trait]
        impl EmbeddingProvider for BrokenProvider {
            fn provider_name(&self) -> &str {
                "broken"
            }

            fn dimensions(&self) -> usize {
                8
            }

            async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
                Err(AppError::Provider("connection refused".to_string()))
            }
        }

        let result = DocumentStore::load_embedded(sample_articles(), Arc::new(BrokenProvider)).await;

        match result {
            Err(AppError::Ingestion(msg)) => assert!(msg.contains("'1'")),
            other => panic!("expected ingestion failure, got {:?}", other.map(|_| ())),
        }
    }
}
